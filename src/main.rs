use anyhow::Context;
use clap::{Parser, Subcommand};
use orgbase::auth::JwtAuthenticator;
use orgbase::config::{AuthSettings, PoolSettings, Settings};
use orgbase::models::user::CurrentUser;
use orgbase::store::PgOrganizationStore;
use orgbase::{create_app, db, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_LOG_FILTER: &str = "orgbase=info,tower_http=debug";

#[derive(Parser)]
#[command(name = "orgbase", version, about = "Organization lookup service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Apply pending migrations before accepting traffic
        #[arg(long)]
        migrate: bool,
    },
    /// Apply database migrations and exit
    Migrate,
    /// Print a signed bearer token for local testing
    Token {
        /// Subject of the token; a fresh id is generated when omitted
        #[arg(long)]
        user_id: Option<Uuid>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        super_admin: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { migrate: false }) {
        Command::Serve { migrate } => serve(migrate).await,
        Command::Migrate => migrate().await,
        Command::Token {
            user_id,
            email,
            super_admin,
        } => issue_token(user_id, email, super_admin),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(
                std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
            )
        })
        .context("Invalid log filter")?;

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

async fn serve(run_migrations: bool) -> anyhow::Result<()> {
    info!("🚀 Starting orgbase v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("Failed to load application settings")?;
    let pool_settings = PoolSettings::load();

    let pool = db::create_pool(&settings.database, &pool_settings).await?;
    if run_migrations {
        db::run_migrations(&pool).await?;
    }

    let authenticator = JwtAuthenticator::from_settings(&settings.auth)
        .context("Failed to initialize token authenticator")?;

    let state = AppState {
        store: Arc::new(PgOrganizationStore::new(pool)),
        authenticator: Arc::new(authenticator),
        config: settings.clone(),
    };

    let app = create_app(state).await;

    let listener = tokio::net::TcpListener::bind(settings.server.address())
        .await
        .context("Failed to bind to server address")?;

    info!("🌐 Listening on {}", settings.server.address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 orgbase shutdown completed");
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load application settings")?;
    let pool = db::create_pool(&settings.database, &PoolSettings::load()).await?;
    db::run_migrations(&pool).await?;
    pool.close().await;
    Ok(())
}

fn issue_token(
    user_id: Option<Uuid>,
    email: Option<String>,
    super_admin: bool,
) -> anyhow::Result<()> {
    // Only the auth section is needed, so a database is not required here
    let settings = AuthSettings::from_lookup(&|key: &str| std::env::var(key).ok())?;
    settings
        .validate()
        .context("Auth configuration validation failed")?;
    let authenticator = JwtAuthenticator::from_settings(&settings)
        .context("Failed to initialize token authenticator")?;

    let user = CurrentUser {
        id: user_id.unwrap_or_else(Uuid::now_v7),
        email,
        is_super_admin: super_admin,
    };
    let token = authenticator.issue(&user).context("Failed to issue token")?;

    println!("{}", token);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("🛑 Received terminate signal, starting graceful shutdown");
        },
    }
}
