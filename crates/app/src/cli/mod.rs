use clap::{Parser, Subcommand};
use tracing_subscriber::util::TryInitError;

mod args;
mod cart;
mod coupon;
mod logging;
mod render;
mod shipping;
mod tax;
mod tenant;

#[derive(Debug, Parser)]
#[command(name = "cartwright-app", about = "Cartwright CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: logging::LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Tenant(tenant::TenantCommand),
    Cart(cart::CartCommand),
    Shipping(shipping::ShippingCommand),
    Tax(tax::TaxCommand),
    Coupon(coupon::CouponCommand),
}

impl Cli {
    pub(crate) fn init_logging(&self) -> Result<(), TryInitError> {
        logging::init(&self.logging)
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Tenant(command) => tenant::run(command).await,
            Commands::Cart(command) => cart::run(command).await,
            Commands::Shipping(command) => shipping::run(command).await,
            Commands::Tax(command) => tax::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
        }
    }
}
