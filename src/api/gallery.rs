//! Photo gallery

use anyhow::{Context, Result};
use serde::Deserialize;

use super::client::PortalClient;
use crate::models::GalleryItem;

#[derive(Debug, Deserialize)]
struct GalleryResponse {
    items: Vec<GalleryItem>,
}

/// List gallery entries (prints to stdout).
pub async fn list_gallery(limit: usize) -> Result<()> {
    let client = super::client::connect()?;
    let items = list_gallery_data(&client, limit).await?;

    println!("\nGallery:");
    println!("{:-<60}", "");

    if items.is_empty() {
        println!("  (gallery is empty)");
        return Ok(());
    }

    for item in &items {
        let title = item.title.as_deref().unwrap_or("(untitled)");
        println!("{:<40} {}", title, item.image_url);
    }

    Ok(())
}

/// Fetch gallery entries and return structured data.
pub async fn list_gallery_data(client: &PortalClient, limit: usize) -> Result<Vec<GalleryItem>> {
    tracing::debug!("Fetching gallery...");
    let resp: GalleryResponse = client
        .get_json(&format!("/gallery?limit={}", limit))
        .await
        .context("Failed to fetch gallery")?;
    Ok(resp.items)
}
