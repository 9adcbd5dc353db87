//! Remove a product from the cart.

use anyhow::Result;
use omakase_cart::ProductId;

use super::{load_cart, RemoveArgs};
use crate::context::Context;

/// Run the remove command.
pub async fn run(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);

    let cart = ctx.open_cart()?;
    let handle = cart.handle();
    load_cart(&handle, ctx).await?;

    let spinner = ctx.output.spinner(&format!("Removing {}...", id));
    let result = handle.remove_item(id).await;
    spinner.finish_and_clear();

    result?;
    ctx.output.success(&format!("Removed product {}", id));
    ctx.output.cart(&handle.view());

    Ok(())
}
