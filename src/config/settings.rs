use anyhow::{Context, Result};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::net::IpAddr;
use std::str::FromStr;
use url::Url;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Settings {
    #[validate]
    pub server: ServerSettings,
    #[validate]
    pub database: DatabaseSettings,
    #[validate]
    pub auth: AuthSettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ServerSettings {
    #[validate(custom = "validate_ip_addr")]
    pub bind_address: String,
    #[validate(range(min = 1024, max = 65535))]
    pub port: u16,
    #[validate(custom = "validate_api_prefix")]
    pub api_prefix: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_connection_bounds"))]
pub struct DatabaseSettings {
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    #[validate(length(min = 1))]
    pub database_name: String,
    /// Applies only when `options` carries no `sslmode`
    pub require_ssl: bool,
    /// Query parameters of `DATABASE_URL`, passed through to the driver
    pub options: Vec<(String, String)>,
    pub min_connections: u32,
    #[validate(range(min = 1))]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AuthSettings {
    pub jwt_secret: Secret<String>,
    #[validate(range(min = 300, max = 2592000))] // 5 minutes to 30 days
    pub jwt_expiration_seconds: u64,
}

impl Settings {
    /// Load configuration from the process environment, after merging `.env`
    /// if one is present.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let settings = Self::from_lookup(|key| std::env::var(key).ok())?;
        settings
            .validate()
            .context("Configuration validation failed")?;

        Ok(settings)
    }

    /// Build settings from an arbitrary key lookup. Validation is left to the
    /// caller.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&str> = ["DATABASE_URL", "JWT_SECRET"]
            .into_iter()
            .filter(|key| lookup(*key).is_none())
            .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}. Please check your .env file or environment configuration.",
                missing.join(", ")
            );
        }

        Ok(Settings {
            server: ServerSettings::from_lookup(&lookup)?,
            database: DatabaseSettings::from_lookup(&lookup)?,
            auth: AuthSettings::from_lookup(&lookup)?,
        })
    }
}

impl ServerSettings {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_address =
            lookup("LISTEN_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let socket_addr: std::net::SocketAddr = listen_address
            .parse()
            .context("Invalid LISTEN_ADDRESS format. Expected format: 'host:port'")?;

        Ok(ServerSettings {
            bind_address: socket_addr.ip().to_string(),
            port: socket_addr.port(),
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string()),
        })
    }

    pub fn address(&self) -> String {
        match self.bind_address.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.bind_address, self.port),
        }
    }
}

impl DatabaseSettings {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let url = Url::parse(&database_url).context("Invalid DATABASE_URL format")?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            anyhow::bail!(
                "Unsupported DATABASE_URL scheme '{}', expected postgres",
                url.scheme()
            );
        }

        let mut options: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        // A `host` parameter wins over the authority, as with libpq; it may
        // name a Unix socket directory.
        let host_param = options
            .iter()
            .position(|(key, _)| key == "host")
            .map(|index| options.remove(index).1);

        let host = host_param
            .or_else(|| {
                url.host_str()
                    .filter(|host| !host.is_empty())
                    .map(str::to_string)
            })
            .context("No host found in DATABASE_URL")?;

        Ok(DatabaseSettings {
            host,
            port: url.port().unwrap_or(5432),
            username: url.username().to_string(),
            password: Secret::new(url.password().unwrap_or_default().to_string()),
            database_name: url.path().trim_start_matches('/').to_string(),
            require_ssl: parse_or(lookup, "DATABASE_REQUIRE_SSL", false)?,
            options,
            min_connections: parse_or(lookup, "DATABASE_MIN_CONNECTIONS", 1)?,
            max_connections: parse_or(lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
        })
    }

    pub fn connection_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.options {
            query.append_pair(key, value);
        }
        if !self.has_ssl_mode() {
            query.append_pair("sslmode", if self.require_ssl { "require" } else { "prefer" });
        }

        let credentials = if self.username.is_empty() {
            String::new()
        } else {
            format!("{}:{}@", self.username, self.password.expose_secret())
        };

        format!(
            "postgres://{}{}:{}/{}?{}",
            credentials,
            self.authority_host(),
            self.port,
            self.database_name,
            query.finish()
        )
    }

    /// Connection string safe for logging.
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "postgres://{}:[HIDDEN]@{}:{}/{}",
            self.username,
            self.authority_host(),
            self.port,
            self.database_name
        )
    }

    /// Whether the host is a Unix socket directory rather than a network host.
    pub fn is_socket(&self) -> bool {
        self.host.starts_with('/')
    }

    fn has_ssl_mode(&self) -> bool {
        self.options
            .iter()
            .any(|(key, _)| key == "sslmode" || key == "ssl-mode")
    }

    // Socket directories go in the authority percent-encoded
    fn authority_host(&self) -> String {
        if self.is_socket() {
            self.host.replace('%', "%25").replace('/', "%2F")
        } else {
            self.host.clone()
        }
    }
}

impl AuthSettings {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret =
            lookup("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        Ok(AuthSettings {
            jwt_secret: Secret::new(jwt_secret),
            jwt_expiration_seconds: parse_or(lookup, "JWT_EXPIRATION_SECONDS", 3600)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

fn validate_ip_addr(addr: &str) -> Result<(), ValidationError> {
    addr.parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_ip_address"))
}

fn validate_api_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.starts_with('/') && !prefix.ends_with('/') {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_api_prefix"))
    }
}

fn validate_connection_bounds(db: &DatabaseSettings) -> Result<(), ValidationError> {
    if db.min_connections > db.max_connections {
        return Err(ValidationError::new("min_connections_exceeds_max"));
    }
    Ok(())
}
