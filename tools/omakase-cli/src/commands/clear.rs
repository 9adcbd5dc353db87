//! Empty the cart locally.

use anyhow::Result;
use dialoguer::Confirm;

use super::ClearArgs;
use crate::context::Context;

/// Run the clear command.
pub async fn run(args: ClearArgs, ctx: &Context) -> Result<()> {
    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("Clear the local cart?")
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Clear cancelled");
            return Ok(());
        }
    }

    let cart = ctx.open_cart()?;
    let handle = cart.handle();
    handle.clear_cart();

    if ctx.output.is_json() {
        ctx.output.json(&handle.view());
    } else {
        ctx.output.success("Cart cleared");
    }

    Ok(())
}
