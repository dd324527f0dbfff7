use std::io;

use cartwright::tax::TaxBreakdown;
use cartwright_app::{context::RequestContext, domain::tax::TaxService};
use clap::Args;

use crate::cli::{
    args::{DatabaseArgs, ShopperArgs},
    render,
};

#[derive(Debug, Args)]
pub(crate) struct CalculateTaxArgs {
    #[command(flatten)]
    shopper: ShopperArgs,

    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: CalculateTaxArgs) -> Result<(), String> {
    let ctx = args.shopper.context()?;
    let app = args.database.connect().await?;

    execute(app.tax.as_ref(), &ctx, &mut io::stdout()).await
}

async fn execute(
    service: &dyn TaxService,
    ctx: &RequestContext,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let breakdown = service
        .calculate(ctx)
        .await
        .map_err(|error| format!("failed to calculate tax: {error}"))?;

    write_breakdown(out, &breakdown).map_err(render::io_error)
}

fn write_breakdown(out: &mut impl io::Write, breakdown: &TaxBreakdown) -> io::Result<()> {
    if !breakdown.details.is_empty() {
        render::write_table(
            out,
            ["Tax", "Rate", "Amount"],
            breakdown.details.iter().map(|line| {
                [
                    line.title.clone(),
                    format!("{}%", line.rate.normalize()),
                    render::money(&line.amount),
                ]
            }),
            1,
        )?;
    }

    render::write_summary(
        out,
        &[
            ("Subtotal", render::money(&breakdown.subtotal)),
            ("Tax", render::money(&breakdown.tax_amount)),
            ("Total", render::money(&breakdown.total)),
        ],
    )
}
