//! Change a product's quantity.

use anyhow::Result;
use omakase_cart::ProductId;

use super::{load_cart, UpdateArgs};
use crate::context::Context;

/// Run the update command.
pub async fn run(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);

    let cart = ctx.open_cart()?;
    let handle = cart.handle();
    load_cart(&handle, ctx).await?;

    let spinner = ctx.output.spinner(&format!("Updating {}...", id));
    let result = handle.update_quantity(id, args.delta).await;
    spinner.finish_and_clear();

    let report = result?;
    match (report.request_sent, report.quantity) {
        (false, Some(quantity)) => ctx
            .output
            .info(&format!("Quantity of product {} stays at {}", id, quantity)),
        (_, Some(quantity)) => ctx
            .output
            .success(&format!("Product {} now x{}", id, quantity)),
        (_, None) => ctx.output.success(&format!("Product {} updated", id)),
    }
    ctx.output.cart(&handle.view());

    Ok(())
}
