use std::io;

use cartwright::shipping::ShippingOption;
use cartwright_app::{context::RequestContext, domain::shipping::ShippingService};
use clap::Args;

use crate::cli::{
    args::{DatabaseArgs, ShopperArgs},
    render,
};

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Price by origin to destination route tariffs instead of rate tables
    #[arg(long)]
    routes: bool,

    #[command(flatten)]
    shopper: ShopperArgs,

    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: QuoteArgs) -> Result<(), String> {
    let ctx = args.shopper.context()?;
    let app = args.database.connect().await?;

    execute(app.shipping.as_ref(), &ctx, args.routes, &mut io::stdout()).await
}

async fn execute(
    service: &dyn ShippingService,
    ctx: &RequestContext,
    routes: bool,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let options = if routes {
        service.quote_routes(ctx).await
    } else {
        service.quote(ctx).await
    }
    .map_err(|error| format!("failed to quote shipping: {error}"))?;

    write_options(out, &options).map_err(render::io_error)
}

fn write_options(out: &mut impl io::Write, options: &[ShippingOption]) -> io::Result<()> {
    if options.is_empty() {
        return writeln!(out, "no shipping methods available for this cart");
    }

    render::write_table(
        out,
        ["Code", "Method", "Carrier", "Price"],
        options.iter().map(|option| {
            [
                option.code.clone(),
                option.name.clone(),
                option.carrier.clone().unwrap_or_default(),
                render::money(&option.price),
            ]
        }),
        3,
    )
}
