//! Credential sign-in against the portal

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::api::transport::{HttpTransport, RequestDescriptor, Transport, REQUEST_TIMEOUT};
use crate::config::Config;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

/// Sign in with email and password, storing the issued token pair.
pub async fn login(email: Option<String>, portal: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(portal) = portal {
        config.portal_url = Some(portal);
    }

    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = prompt("Password: ")?;
    if password.is_empty() {
        bail!("Password must not be empty.");
    }

    let transport = HttpTransport::new(config.portal_url());

    tracing::info!("Signing in...");
    let req = RequestDescriptor::post(
        "/auth/login",
        serde_json::json!({ "email": email, "password": password }),
    );
    let resp = transport
        .send(&req, REQUEST_TIMEOUT)
        .await
        .context("Login request failed")?;

    if !resp.status.is_success() {
        bail!("Login failed: HTTP {}", resp.status.as_u16());
    }

    let tokens: LoginResponse = resp.json().context("Failed to parse login response")?;

    config.access_token = Some(tokens.token);
    config.refresh_token = Some(tokens.refresh_token);
    config.save()?;

    println!("Login successful.");
    Ok(())
}

/// Clear stored credentials
pub async fn logout() -> Result<()> {
    let mut config = Config::load()?;
    config.clear_tokens();
    config.save()?;
    println!("Logged out.");
    Ok(())
}

/// Display current auth status
pub async fn status() -> Result<()> {
    let config = Config::load()?;

    println!("Portal:        {}", config.portal_url());
    match config.access_token {
        Some(_) => println!("Access token:  present"),
        None => println!("Access token:  none"),
    }
    match config.refresh_token {
        Some(_) => println!("Refresh token: present"),
        None => println!("Refresh token: none"),
    }

    if config.access_token.is_none() && config.refresh_token.is_none() {
        println!("\nRun 'parish-cli login' to authenticate.");
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
