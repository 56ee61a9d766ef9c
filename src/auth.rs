use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::error::ApiError;
use crate::models::user::CurrentUser;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_super_admin: bool,
    pub exp: usize, // expiration time
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingCredentials,
    #[error("Token has expired")]
    Expired,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("Token subject is not a valid user id")]
    InvalidSubject,
    #[error("Failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("Token lifetime of {0} seconds is out of range")]
    InvalidLifetime(u64),
}

/// Resolves a bearer token to the calling user.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError>;
}

/// HS256 tokens signed with the shared `JWT_SECRET`.
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: chrono::Duration,
}

impl JwtAuthenticator {
    pub fn new(secret: &[u8], expiration_seconds: u64) -> Result<Self, AuthError> {
        let expiration = i64::try_from(expiration_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or(AuthError::InvalidLifetime(expiration_seconds))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            expiration,
        })
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self, AuthError> {
        Self::new(
            settings.jwt_secret.expose_secret().as_bytes(),
            settings.jwt_expiration_seconds,
        )
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("Token verification error: {:?}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        tracing::debug!(
            "Token verified successfully for user ID: {}",
            token_data.claims.sub
        );
        Ok(token_data.claims)
    }

    /// Sign an access token for `user` valid for the configured lifetime.
    pub fn issue(&self, user: &CurrentUser) -> Result<String, AuthError> {
        let expires_at = chrono::Utc::now()
            .checked_add_signed(self.expiration)
            .and_then(|at| usize::try_from(at.timestamp()).ok())
            .ok_or(AuthError::InvalidLifetime(
                self.expiration.num_seconds().unsigned_abs(),
            ))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            is_super_admin: user.is_super_admin,
            exp: expires_at,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Signing)
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.verify_token(token)?;
        let id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthError::InvalidSubject)?;

        Ok(CurrentUser {
            id,
            email: claims.email,
            is_super_admin: claims.is_super_admin,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(authorization) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    tracing::debug!("Rejected authorization header: {}", e);
                    AuthError::MissingCredentials
                })?;

        let state = AppState::from_ref(state);
        let user = state.authenticator.authenticate(authorization.token()).await?;
        Ok(user)
    }
}
