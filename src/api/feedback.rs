//! Feedback submission

use anyhow::{Context, Result};

/// Send a feedback message to the parish office.
pub async fn send_feedback(message: &str) -> Result<()> {
    let client = super::client::connect()?;

    tracing::debug!("Submitting feedback...");
    let _: serde_json::Value = client
        .post_json(
            "/feedback",
            serde_json::json!({ "message": message }),
        )
        .await
        .context("Failed to submit feedback")?;

    println!("Feedback sent. Thank you!");
    Ok(())
}
