pub mod auth;
pub mod chat;
pub mod config;
pub mod profiles;
pub mod res;
pub mod session;
pub mod store;

use std::sync::Arc;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use profiles::ProfileResolver;
use store::SharedStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: SharedStore,
    pub resolver: ProfileResolver,
    pub stickers: Stickers,
}

#[derive(Clone, Debug)]
pub struct Stickers(pub Arc<[String]>);

/// Builds the full router with its session layer.
pub fn app(state: AppState, session_ttl: time::Duration) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(session_ttl));

    Router::new()
        .merge(auth::router())
        .nest("/chat", chat::router())
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FieldError(String);

pub trait GetField {
    fn get_str_field(&self, field: &str) -> Result<String, FieldError>;
    fn get_opt_str_field(&self, field: &str) -> Result<Option<String>, FieldError>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> Result<String, FieldError> {
        self.get_opt_str_field(field)?
            .ok_or_else(|| FieldError(format!("expected {field} in {self}")))
    }

    // null and missing both read as None
    fn get_opt_str_field(&self, field: &str) -> Result<Option<String>, FieldError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.to_owned())),
            Some(_) => Err(FieldError(format!("expected {field} in {self} to be string"))),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
