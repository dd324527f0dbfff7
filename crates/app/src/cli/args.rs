//! Arguments shared across commands

use cartwright_app::context::{AppContext, AppInitError, RequestContext};
use clap::Args;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub(crate) database_url: String,
}

impl DatabaseArgs {
    pub(crate) async fn connect(&self) -> Result<AppContext, String> {
        AppContext::from_database_url(&self.database_url)
            .await
            .map_err(|AppInitError::Database(error)| {
                format!("failed to connect to database: {error}")
            })
    }
}

/// Whose cart a command acts on.
#[derive(Debug, Args)]
pub(crate) struct ShopperArgs {
    /// Tenant the cart belongs to
    #[arg(long)]
    tenant_uuid: Uuid,

    /// Signed-in customer
    #[arg(long, conflicts_with = "session", required_unless_present = "session")]
    customer_uuid: Option<Uuid>,

    /// Guest session token
    #[arg(long)]
    session: Option<String>,
}

impl ShopperArgs {
    pub(crate) fn context(&self) -> Result<RequestContext, String> {
        let tenant = self.tenant_uuid.into();

        match (self.customer_uuid, self.session.as_deref()) {
            (Some(customer), _) => Ok(RequestContext::customer(tenant, customer.into())),
            (None, Some(session)) => Ok(RequestContext::guest(tenant, session)),
            (None, None) => Err("either --customer-uuid or --session is required".to_string()),
        }
    }
}
