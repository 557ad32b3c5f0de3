//! Planning errors surfaced to callers.

use detour_core::GeometryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed obstacles, endpoints or route geometry. Never retried.
    #[error("invalid geometry input: {0}")]
    Geometry(#[from] GeometryError),

    /// The request body could not be decoded into a plan request.
    #[error("invalid geometry input: {0}")]
    InvalidRequest(String),

    /// The provider answered with a non-success status.
    #[error("route provider error {status}: {message}")]
    ProviderStatus { status: u16, message: String },

    /// The provider answered 2xx but the body could not be used.
    #[error("route provider returned a malformed payload: {0}")]
    ProviderPayload(String),

    /// Network failure or timeout talking to the provider.
    #[error("route provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("route provider API key is not configured")]
    MissingApiKey,

    #[error("planning request was cancelled")]
    Cancelled,
}

impl PlanError {
    pub fn kind(&self) -> &'static str {
        match self {
            PlanError::Geometry(_) | PlanError::InvalidRequest(_) => "invalid_geometry_input",
            PlanError::ProviderStatus { .. } | PlanError::ProviderPayload(_) => "provider_error",
            PlanError::ProviderUnavailable(_) => "provider_unavailable",
            PlanError::MissingApiKey => "provider_not_configured",
            PlanError::Cancelled => "cancelled",
        }
    }
}

impl From<reqwest::Error> for PlanError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PlanError::ProviderPayload(err.to_string())
        } else if let Some(status) = err.status() {
            PlanError::ProviderStatus {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            PlanError::ProviderUnavailable(err.to_string())
        }
    }
}
