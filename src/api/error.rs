//! Error taxonomy and failed-response classification.

use reqwest::StatusCode;
use thiserror::Error;

use super::transport::TransportError;

/// Terminal outcomes surfaced to callers. Classification and the single
/// refresh-driven retry happen inside the client; callers only ever see one
/// of these.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session expired; run 'parish-cli login' to sign in again")]
    SessionExpired,
    #[error("rate limited by the portal (HTTP 429)")]
    RateLimited { body: String },
    #[error("portal is under maintenance (HTTP 503)")]
    Maintenance,
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => ApiError::Timeout,
            TransportError::Network(msg) => ApiError::Network(msg),
        }
    }
}

/// How a failed response should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classification {
    /// 401 eligible for one refresh-and-retry cycle.
    UnauthorizedRecoverable,
    /// 401 with nothing left to try: end the session.
    UnauthorizedIrrecoverable,
    /// 429, surfaced as-is, never retried.
    RateLimited,
    /// 503, surfaced as-is plus a one-time maintenance redirect.
    Maintenance,
    /// Everything else, surfaced unchanged.
    Other,
}

/// Classify a non-success response. Pure and synchronous.
///
/// A 401 is recoverable only if it did not come from the refresh endpoint
/// itself and the request has not already been retried after a refresh.
pub(crate) fn classify(
    status: StatusCode,
    is_refresh_call: bool,
    retried_after_refresh: bool,
) -> Classification {
    match status {
        StatusCode::SERVICE_UNAVAILABLE => Classification::Maintenance,
        StatusCode::TOO_MANY_REQUESTS => Classification::RateLimited,
        StatusCode::UNAUTHORIZED if is_refresh_call || retried_after_refresh => {
            Classification::UnauthorizedIrrecoverable
        }
        StatusCode::UNAUTHORIZED => Classification::UnauthorizedRecoverable,
        _ => Classification::Other,
    }
}
