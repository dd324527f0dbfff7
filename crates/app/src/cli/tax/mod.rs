use clap::{Args, Subcommand};

mod calculate;

#[derive(Debug, Args)]
pub(crate) struct TaxCommand {
    #[command(subcommand)]
    command: TaxSubcommand,
}

#[derive(Debug, Subcommand)]
enum TaxSubcommand {
    Calculate(calculate::CalculateTaxArgs),
}

pub(crate) async fn run(command: TaxCommand) -> Result<(), String> {
    match command.command {
        TaxSubcommand::Calculate(args) => calculate::run(args).await,
    }
}
