//! Sermon archive

use anyhow::{Context, Result};
use serde::Deserialize;

use super::client::PortalClient;
use crate::models::Sermon;

#[derive(Debug, Deserialize)]
struct SermonsResponse {
    items: Vec<Sermon>,
}

/// List recent sermons (prints to stdout).
pub async fn list_sermons(limit: usize) -> Result<()> {
    let client = super::client::connect()?;
    let sermons = list_sermons_data(&client, limit).await?;

    println!("\nRecent sermons:");
    println!("{:-<60}", "");

    if sermons.is_empty() {
        println!("  (no sermons found)");
        return Ok(());
    }

    for sermon in &sermons {
        let speaker = sermon.speaker.as_deref().unwrap_or("unknown");
        println!(
            "{}  {:<40} {}",
            sermon.preached_at.format("%Y-%m-%d"),
            sermon.title,
            speaker
        );
        if let Some(ref url) = sermon.audio_url {
            println!("    audio: {}", url);
        }
    }

    Ok(())
}

/// Fetch recent sermons and return structured data.
pub async fn list_sermons_data(client: &PortalClient, limit: usize) -> Result<Vec<Sermon>> {
    tracing::debug!("Fetching sermons...");
    let resp: SermonsResponse = client
        .get_json(&format!("/sermons?limit={}", limit))
        .await
        .context("Failed to fetch sermons")?;
    Ok(resp.items)
}
