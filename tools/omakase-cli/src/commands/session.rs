//! Print or end the session.

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use omakase_store::Storage;
use serde_json::json;

use super::SessionArgs;
use crate::context::Context;

/// Run the session command.
pub async fn run(args: SessionArgs, ctx: &Context) -> Result<()> {
    if args.end {
        return end(args.yes, ctx);
    }

    let cart = ctx.open_cart()?;
    let session = cart.handle().session_id();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "session_id": session,
            "storage_dir": ctx.storage_dir(),
        }));
    } else {
        println!("{}", session);
        ctx.output.kv("storage", &ctx.storage_dir().display().to_string());
    }

    Ok(())
}

fn end(yes: bool, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("End the session? The cart on this machine is forgotten.")
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Session kept");
            return Ok(());
        }
    }

    let removed = end_session(&ctx.storage()?)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "ended": true, "removed": removed }));
    } else if removed.is_empty() {
        ctx.output.info("No session to end");
    } else {
        ctx.output.success("Session ended");
        for key in &removed {
            ctx.output.debug(&format!("removed {}", key));
        }
    }

    Ok(())
}

/// Wipe the session store. Returns the keys that were removed.
fn end_session(storage: &Storage) -> Result<Vec<String>> {
    let keys = storage.keys().context("Failed to list session keys")?;
    storage.clear().context("Failed to clear session store")?;
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omakase_store::{MemoryStore, SessionIdentity};

    #[test]
    fn test_end_session_forgets_token_and_cart() {
        let storage = Storage::new(MemoryStore::new());
        let first = SessionIdentity::new(storage.clone()).session_id();
        storage.set_string("carrinho", "[]").unwrap();

        let mut removed = end_session(&storage).unwrap();
        removed.sort();

        assert_eq!(removed, vec!["carrinho", "sessionId"]);
        assert!(storage.keys().unwrap().is_empty());
        assert_ne!(SessionIdentity::new(storage).session_id(), first);
    }

    #[test]
    fn test_end_empty_session() {
        let storage = Storage::new(MemoryStore::new());
        assert!(end_session(&storage).unwrap().is_empty());
    }
}
