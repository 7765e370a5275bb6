//! Donations and pledges for the signed-in member

use anyhow::{Context, Result};
use serde::Deserialize;

use super::client::PortalClient;
use crate::models::{Donation, PledgeRequest};

#[derive(Debug, Deserialize)]
struct DonationsResponse {
    items: Vec<Donation>,
}

/// List the member's donations (prints to stdout).
pub async fn list_donations() -> Result<()> {
    let client = super::client::connect()?;
    let donations = list_donations_data(&client).await?;

    println!("\nYour donations:");
    println!("{:-<60}", "");

    if donations.is_empty() {
        println!("  (no donations recorded)");
        return Ok(());
    }

    let mut total: i64 = 0;
    for donation in &donations {
        println!(
            "{}  {:<30} {:>10}",
            donation.given_at.format("%Y-%m-%d"),
            donation.purpose,
            format_cents(donation.amount_cents)
        );
        total += donation.amount_cents;
    }
    println!("{:-<60}", "");
    println!("{:>53}", format_cents(total));

    Ok(())
}

/// Fetch the member's donations and return structured data.
pub async fn list_donations_data(client: &PortalClient) -> Result<Vec<Donation>> {
    tracing::debug!("Fetching donations...");
    let resp: DonationsResponse = client
        .get_json("/donations")
        .await
        .context("Failed to fetch donations")?;
    Ok(resp.items)
}

/// Submit a pledge.
pub async fn submit_pledge(purpose: &str, amount_cents: i64, note: Option<String>) -> Result<()> {
    let client = super::client::connect()?;
    let pledge = PledgeRequest {
        purpose: purpose.to_string(),
        amount_cents,
        note,
    };

    tracing::debug!("Submitting pledge for {}", purpose);
    let body = serde_json::to_value(&pledge).context("Failed to serialize pledge")?;
    let _: serde_json::Value = client
        .post_json("/donations/pledge", body)
        .await
        .context("Failed to submit pledge")?;

    println!(
        "Pledge of {} to '{}' recorded.",
        format_cents(amount_cents),
        purpose
    );
    Ok(())
}

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}
