//! Parish CLI - Lightweight client for the Parish Community Portal
//!
//! A terminal client for the parish portal: events, sermons, gallery,
//! donations, and feedback.

mod api;
mod auth;
mod config;
mod models;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "parish-cli")]
#[command(about = "Lightweight CLI client for the Parish Community Portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the portal
    Login {
        /// Email address (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Portal base URL (stored for later runs)
        #[arg(long)]
        portal: Option<String>,
    },

    /// Log out and clear cached credentials
    Logout,

    /// Show current authentication status
    Status,

    /// List upcoming events
    Events {
        /// Maximum number of events to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List recent sermons
    Sermons {
        /// Maximum number of sermons to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List photo gallery entries
    Gallery {
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List your donations
    Donations,

    /// Submit a pledge
    Pledge {
        /// Fund or campaign the pledge goes to
        #[arg(short, long)]
        purpose: String,

        /// Amount in cents
        #[arg(short, long)]
        amount: i64,

        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Send feedback to the parish office
    Feedback {
        /// Feedback message
        message: String,
    },

    /// Show current member info (verify auth works)
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Login { email, portal } => {
            tracing::info!("Starting sign-in...");
            auth::login(email, portal).await?;
        }
        Commands::Logout => {
            tracing::info!("Logging out...");
            auth::logout().await?;
        }
        Commands::Status => {
            auth::status().await?;
        }
        Commands::Events { limit } => {
            tracing::info!("Fetching events...");
            api::list_events(limit).await?;
        }
        Commands::Sermons { limit } => {
            api::list_sermons(limit).await?;
        }
        Commands::Gallery { limit } => {
            api::list_gallery(limit).await?;
        }
        Commands::Donations => {
            api::list_donations().await?;
        }
        Commands::Pledge {
            purpose,
            amount,
            note,
        } => {
            tracing::info!("Submitting pledge...");
            api::submit_pledge(&purpose, amount, note).await?;
        }
        Commands::Feedback { message } => {
            api::send_feedback(&message).await?;
        }
        Commands::Whoami => {
            api::whoami().await?;
        }
    }

    Ok(())
}
