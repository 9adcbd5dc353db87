//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let cart = &ctx.config.cart;
    ctx.output.info("");
    ctx.output.info("[cart]");
    ctx.output.kv("api_url", &cart.api_url);
    ctx.output.kv("cart_path", &cart.cart_path);
    ctx.output.kv("session_header", &cart.session_header);
    ctx.output.kv("session_key", &cart.session_key);
    ctx.output.kv("mirror_key", &cart.mirror_key);
    ctx.output.kv("stale_time_ms", &cart.stale_time_ms.to_string());
    ctx.output.kv("timeout.connect_ms", &cart.timeout.connect_ms.to_string());
    ctx.output.kv("timeout.total_ms", &cart.timeout.total_ms.to_string());

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.storage_dir().display().to_string());

    if let Err(e) = cart.validate() {
        ctx.output.warn(&e.to_string());
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
