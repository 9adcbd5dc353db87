//! Add a product to the cart.

use anyhow::{bail, Result};
use omakase_cart::{Money, Product};

use super::{load_cart, AddArgs};
use crate::context::Context;

/// Run the add command.
pub async fn run(args: AddArgs, ctx: &Context) -> Result<()> {
    if !args.price.is_finite() || args.price < 0.0 {
        bail!("Price must be a non-negative number, got {}", args.price);
    }

    let product = Product::new(args.id, args.name, Money::from_decimal(args.price), args.image);

    let cart = ctx.open_cart()?;
    let handle = cart.handle();
    load_cart(&handle, ctx).await?;

    let spinner = ctx.output.spinner(&format!("Adding {}...", product.name));
    let result = handle.add_item(&product, args.quantity, &args.notes).await;
    spinner.finish_and_clear();

    let report = result?;
    ctx.output.success(&format!(
        "{} x{} ({})",
        product.name, args.quantity, report.kind
    ));
    ctx.output.cart(&handle.view());

    Ok(())
}
