use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error};

/// Failure taxonomy shared by the services, the panel and the HTTP routes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session or path absent. Terminal for the user, never retried.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),

    /// Superseded by a newer navigation or browse. Silent.
    #[error("superseded by a newer request")]
    Cancelled,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::not_found("session", id)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Message shown to the user. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { entity: "session", .. } => "Session not found".to_string(),
            Self::NotFound { entity, .. } => {
                let mut chars = entity.chars();
                match chars.next() {
                    Some(first) => format!("{}{} not found", first.to_uppercase(), chars.as_str()),
                    None => "Not found".to_string(),
                }
            }
            Self::InvalidInput(msg) => msg.clone(),
            Self::Internal(_) => "Something went wrong. Reload to try again.".to_string(),
            Self::Cancelled => "Request superseded".to_string(),
        }
    }

    /// Log at the level the taxonomy assigns to this kind of failure.
    pub fn log(&self, context: &str) {
        match self {
            Self::Internal(e) => error!(context, error = %format!("{e:#}"), "internal failure"),
            Self::Cancelled => debug!(context, "request cancelled"),
            other => debug!(context, error = %other, "request rejected"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Only reachable when a route applies a stale panel result.
            Self::Cancelled => StatusCode::CONFLICT,
        }
    }

    /// `(status, {"error": ...})` pair in the shape every route returns.
    pub fn into_response_parts(self, context: &str) -> (StatusCode, Json<Value>) {
        self.log(context);
        (self.status_code(), Json(json!({ "error": self.user_message() })))
    }
}
