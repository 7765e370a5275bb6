//! Portal events: upcoming services and gatherings

use anyhow::{Context, Result};
use serde::Deserialize;

use super::client::PortalClient;
use crate::models::Event;

#[derive(Debug, Deserialize)]
struct EventsResponse {
    items: Vec<Event>,
}

/// List upcoming events (prints to stdout).
pub async fn list_events(limit: usize) -> Result<()> {
    let client = super::client::connect()?;
    let events = list_events_data(&client, limit).await?;

    println!("\nUpcoming events:");
    println!("{:-<60}", "");

    if events.is_empty() {
        println!("  (no upcoming events)");
        return Ok(());
    }

    for event in &events {
        println!(
            "{}  {}",
            event.starts_at.format("%Y-%m-%d %H:%M"),
            event.title
        );
        if let Some(ref location) = event.location {
            println!("    at {}", location);
        }
    }

    Ok(())
}

/// Fetch upcoming events and return structured data.
pub async fn list_events_data(client: &PortalClient, limit: usize) -> Result<Vec<Event>> {
    tracing::debug!("Fetching events...");
    let resp: EventsResponse = client
        .get_json(&format!("/events?limit={}", limit))
        .await
        .context("Failed to fetch events")?;
    Ok(resp.items)
}
