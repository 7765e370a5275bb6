//! Current member info

use anyhow::{Context, Result};

use super::client::PortalClient;
use crate::models::Profile;

/// Show current member info (verify auth works).
pub async fn whoami() -> Result<()> {
    let client = super::client::connect()?;
    let profile = whoami_data(&client).await?;

    let name = profile.display_name.as_deref().unwrap_or("(no name)");
    let email = profile.email.as_deref().unwrap_or("(no email)");
    println!("Signed in as: {} <{}>", name, email);
    if !profile.roles.is_empty() {
        println!("Roles:        {}", profile.roles.join(", "));
    }

    Ok(())
}

/// Fetch the signed-in member's profile.
pub async fn whoami_data(client: &PortalClient) -> Result<Profile> {
    tracing::debug!("Fetching profile...");
    client.get_json("/me").await.context("Failed to fetch profile")
}
