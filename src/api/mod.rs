//! API client module for the Parish Portal

pub mod client;
mod donations;
pub mod error;
mod events;
mod feedback;
mod gallery;
mod me;
mod refresh;
mod sermons;
pub mod transport;

use anyhow::Result;

pub use error::ApiError;

/// List upcoming events
pub async fn list_events(limit: usize) -> Result<()> {
    events::list_events(limit).await
}

/// List recent sermons
pub async fn list_sermons(limit: usize) -> Result<()> {
    sermons::list_sermons(limit).await
}

/// List gallery entries
pub async fn list_gallery(limit: usize) -> Result<()> {
    gallery::list_gallery(limit).await
}

/// List the member's donations
pub async fn list_donations() -> Result<()> {
    donations::list_donations().await
}

/// Submit a pledge
pub async fn submit_pledge(purpose: &str, amount_cents: i64, note: Option<String>) -> Result<()> {
    donations::submit_pledge(purpose, amount_cents, note).await
}

/// Send feedback to the parish office
pub async fn send_feedback(message: &str) -> Result<()> {
    feedback::send_feedback(message).await
}

/// Show current member info
pub async fn whoami() -> Result<()> {
    me::whoami().await
}
