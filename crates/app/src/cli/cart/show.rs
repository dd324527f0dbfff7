use std::io;

use cartwright::cart::Cart;
use cartwright_app::{
    context::RequestContext,
    domain::carts::{CartsService, records::CartRecord},
};
use clap::Args;

use crate::cli::{
    args::{DatabaseArgs, ShopperArgs},
    render,
};

#[derive(Debug, Args)]
pub(crate) struct ShowCartArgs {
    #[command(flatten)]
    shopper: ShopperArgs,

    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: ShowCartArgs) -> Result<(), String> {
    let ctx = args.shopper.context()?;
    let app = args.database.connect().await?;

    execute(app.carts.as_ref(), &ctx, &mut io::stdout()).await
}

async fn execute(
    service: &dyn CartsService,
    ctx: &RequestContext,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let record = service
        .get_cart(ctx)
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    write_cart(out, &record).map_err(render::io_error)
}

fn write_cart(out: &mut impl io::Write, record: &CartRecord) -> io::Result<()> {
    writeln!(out, "cart {} for {}", record.uuid, record.identity)?;

    if record.cart.is_empty() {
        writeln!(out, "(no items)")?;
    } else {
        render::write_table(
            out,
            ["SKU", "Item", "Qty", "Price", "Total"],
            record.cart.items().iter().map(|item| {
                [
                    item.sku.clone(),
                    item.name.clone(),
                    item.quantity().to_string(),
                    render::money(&item.price),
                    render::money(&item.row_total()),
                ]
            }),
            2,
        )?;
    }

    render::write_summary(out, &summary(&record.cart))
}

fn summary(cart: &Cart) -> Vec<(&'static str, String)> {
    let totals = cart.totals();

    let mut lines = vec![("Subtotal", render::money(&totals.subtotal))];

    if let Some(coupon) = cart.coupon() {
        lines.push(("Coupon", coupon.code.clone()));
    }

    lines.push(("Discount", render::money(&totals.discount)));

    if let Some(shipping) = cart.shipping() {
        lines.push(("Shipping method", shipping.name.clone()));
    }

    lines.extend([
        ("Shipping", render::money(&totals.shipping)),
        ("Tax", render::money(&totals.tax)),
        ("Grand total", render::money(&totals.grand_total)),
    ]);

    lines
}
