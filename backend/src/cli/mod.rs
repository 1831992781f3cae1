//! Command line interface
//!
//! - `serve`: run the HTTP server (default)
//! - `migrate`: apply database migrations and exit
//! - `bootstrap`: create a merchant's first user, so someone can log in

use crate::state::AppState;
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use pos_shared::CreateUserRequest;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// POS user-management backend
#[derive(Parser, Debug)]
#[command(name = "pos-backend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Create a user, and optionally its merchant, without an access token
    Bootstrap(BootstrapArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[command(group(
    clap::ArgGroup::new("merchant")
        .required(true)
        .args(["merchant_name", "merchant_id"])
))]
pub struct BootstrapArgs {
    /// Name of a new merchant to create
    #[arg(long)]
    pub merchant_name: Option<String>,

    /// Logo reference for the new merchant
    #[arg(long, requires = "merchant_name")]
    pub merchant_logo: Option<String>,

    /// Existing merchant to add the user to
    #[arg(long)]
    pub merchant_id: Option<i64>,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "POS_BOOTSTRAP_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: Option<String>,
}

/// Ids produced by a bootstrap run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOutcome {
    pub merchant_id: i64,
    pub user_id: i64,
}

/// Create the merchant (if asked to) and the user through the regular services
pub async fn bootstrap(state: &AppState, args: BootstrapArgs) -> anyhow::Result<BootstrapOutcome> {
    let cancel = CancellationToken::new();

    let merchant_id = match (args.merchant_id, args.merchant_name) {
        (Some(id), _) => state
            .merchants()
            .find_merchant(&cancel, id)
            .await?
            .ok_or_else(|| anyhow!("merchant {} does not exist", id))?
            .id,
        (None, Some(name)) => {
            state
                .merchants()
                .create_merchant(&cancel, &name, args.merchant_logo)
                .await?
                .id
        }
        (None, None) => return Err(anyhow!("either --merchant-id or --merchant-name is required")),
    };

    let user_id = state
        .user_admin()
        .create_user(
            &cancel,
            merchant_id,
            CreateUserRequest {
                email: args.email,
                password: args.password,
                first_name: args.first_name,
                last_name: args.last_name,
            },
        )
        .await
        .context("failed to create bootstrap user")?;

    info!(merchant_id, user_id, "Bootstrap complete");
    Ok(BootstrapOutcome {
        merchant_id,
        user_id,
    })
}
