//! Show the cart.

use anyhow::Result;

use super::load_cart;
use crate::context::Context;

/// Run the show command.
pub async fn run(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let handle = cart.handle();

    load_cart(&handle, ctx).await?;
    ctx.output.cart(&handle.view());

    Ok(())
}
