use clap::{Args, Subcommand};

mod quote;

#[derive(Debug, Args)]
pub(crate) struct ShippingCommand {
    #[command(subcommand)]
    command: ShippingSubcommand,
}

#[derive(Debug, Subcommand)]
enum ShippingSubcommand {
    Quote(quote::QuoteArgs),
}

pub(crate) async fn run(command: ShippingCommand) -> Result<(), String> {
    match command.command {
        ShippingSubcommand::Quote(args) => quote::run(args).await,
    }
}
