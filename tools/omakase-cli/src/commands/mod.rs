//! CLI command implementations.

pub mod add;
pub mod clear;
pub mod config;
pub mod remove;
pub mod session;
pub mod show;
pub mod update;

use anyhow::Result;
use clap::{Args, Subcommand};
use omakase_cart::{CartHandle, QueryResult};

use crate::context::Context;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product ID.
    #[arg(long)]
    pub id: u64,

    /// Product name.
    #[arg(long)]
    pub name: String,

    /// Unit price.
    #[arg(long)]
    pub price: f64,

    /// Image reference.
    #[arg(long, default_value = "")]
    pub image: String,

    /// Units to add.
    #[arg(short, long, default_value_t = 1)]
    pub quantity: u32,

    /// Notes for the kitchen.
    #[arg(short, long, default_value = "")]
    pub notes: String,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Product ID.
    pub id: u64,
}

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Product ID.
    pub id: u64,

    /// Quantity change, e.g. 1 or -1.
    #[arg(allow_hyphen_values = true)]
    pub delta: i64,
}

/// Arguments for the clear command.
#[derive(Args)]
pub struct ClearArgs {
    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the session command.
#[derive(Args)]
pub struct SessionArgs {
    /// End the session, deleting its token and mirrored cart.
    #[arg(long)]
    pub end: bool,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Create a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
}

/// Read the cart before acting on it, so mutations see current lines.
pub(crate) async fn load_cart(handle: &CartHandle, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Loading cart...");
    let result = handle.fetch().await;
    spinner.finish_and_clear();

    match result {
        QueryResult::Error(message) => {
            ctx.output.warn(&format!("Could not read cart: {}", message));
        }
        QueryResult::Loading | QueryResult::Success(_) => {}
    }
    Ok(())
}
