#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use metrics::atomics::AtomicU64;
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use secrecy::Secret;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

use orgbase::auth::JwtAuthenticator;
use orgbase::config::{AuthSettings, DatabaseSettings, ServerSettings, Settings};
use orgbase::models::organization::Organization;
use orgbase::models::user::CurrentUser;
use orgbase::store::OrganizationStore;
use orgbase::{create_app, AppState};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

#[derive(Default, Clone)]
pub struct MockOrganizationStore {
    organizations: Arc<Mutex<HashMap<Uuid, Organization>>>,
    lookups: Arc<AtomicUsize>,
    failing: bool,
}

impl MockOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, as if the database were down
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, organization: Organization) {
        self.organizations
            .lock()
            .unwrap()
            .insert(organization.id, organization);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrganizationStore for MockOrganizationStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Organization>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            anyhow::bail!("connection refused");
        }

        let organizations = self.organizations.lock().unwrap();
        Ok(organizations.get(&id).cloned())
    }

    async fn health_check(&self) -> Result<()> {
        if self.failing {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

/// An organization with a fresh time-ordered id and only the required name set
pub fn organization(company_name: &str) -> Organization {
    let now = Utc::now();
    Organization {
        id: Uuid::now_v7(),
        company_name: company_name.to_string(),
        company_email: None,
        industry: None,
        organization_type: None,
        country: None,
        state: None,
        address: None,
        lga: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            api_prefix: "/api/v1".to_string(),
        },
        database: DatabaseSettings {
            host: "localhost".to_string(),
            port: 5433,
            username: "test".to_string(),
            password: Secret::new("test".to_string()),
            database_name: "test".to_string(),
            require_ssl: false,
            options: Vec::new(),
            min_connections: 1,
            max_connections: 5,
        },
        auth: AuthSettings {
            jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()),
            jwt_expiration_seconds: 3600,
        },
    }
}

/// Records counter increments by `name{label=value,...}`
#[derive(Default, Clone)]
pub struct CountingRecorder {
    counters: Arc<Mutex<HashMap<String, Arc<AtomicU64>>>>,
}

impl CountingRecorder {
    pub fn counter(&self, key: &str) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(key)
            .map(|value| value.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        let labels: Vec<String> = key
            .labels()
            .map(|label| format!("{}={}", label.key(), label.value()))
            .collect();
        let name = format!("{}{{{}}}", key.name(), labels.join(","));

        let value = self
            .counters
            .lock()
            .unwrap()
            .entry(name)
            .or_default()
            .clone();
        Counter::from_arc(value)
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MockOrganizationStore,
    pub authenticator: Arc<JwtAuthenticator>,
}

impl TestApp {
    pub async fn new(store: MockOrganizationStore) -> Self {
        Self::with_settings(store, test_settings()).await
    }

    pub async fn with_settings(store: MockOrganizationStore, settings: Settings) -> Self {
        let authenticator = Arc::new(JwtAuthenticator::from_settings(&settings.auth).unwrap());

        let state = AppState {
            config: settings,
            store: Arc::new(store.clone()),
            authenticator: authenticator.clone(),
        };

        Self {
            router: create_app(state).await,
            store,
            authenticator,
        }
    }

    /// Bearer token for a regular, non-admin user
    pub fn user_token(&self) -> String {
        let user = CurrentUser {
            id: Uuid::now_v7(),
            email: Some("testuser@gmail.com".to_string()),
            is_super_admin: false,
        };
        self.authenticator.issue(&user).unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, json)
    }
}
