use clap::{Args, Subcommand};

mod create;
mod show;

#[derive(Debug, Args)]
pub(crate) struct TenantCommand {
    #[command(subcommand)]
    command: TenantSubcommand,
}

#[derive(Debug, Subcommand)]
enum TenantSubcommand {
    /// Register a store
    Create(create::CreateTenantArgs),

    /// Print a store's details
    Show(show::ShowTenantArgs),
}

pub(crate) async fn run(command: TenantCommand) -> Result<(), String> {
    match command.command {
        TenantSubcommand::Create(args) => create::run(args).await,
        TenantSubcommand::Show(args) => show::run(args).await,
    }
}
