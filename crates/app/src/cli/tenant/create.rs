use std::io;

use cartwright_app::domain::tenants::{TenantsService, data::NewTenant};
use clap::Args;
use uuid::Uuid;

use crate::cli::{args::DatabaseArgs, render};

use super::show::write_tenant;

#[derive(Debug, Args)]
pub(crate) struct CreateTenantArgs {
    /// Store display name
    #[arg(long)]
    name: String,

    /// Tenant UUID; generated when omitted
    #[arg(long)]
    tenant_uuid: Option<Uuid>,

    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: CreateTenantArgs) -> Result<(), String> {
    let app = args.database.connect().await?;

    execute(app.tenants.as_ref(), args, &mut io::stdout()).await
}

async fn execute(
    service: &dyn TenantsService,
    args: CreateTenantArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let tenant = service
        .create_tenant(NewTenant {
            uuid: args.tenant_uuid.unwrap_or_else(Uuid::now_v7).into(),
            name: args.name,
        })
        .await
        .map_err(|error| format!("failed to create tenant: {error}"))?;

    write_tenant(out, &tenant).map_err(render::io_error)
}

#[cfg(test)]
mod tests {
    use cartwright_app::domain::tenants::{
        MockTenantsService, TenantsServiceError, records::TenantRecord,
    };
    use jiff::Timestamp;
    use testresult::TestResult;

    use super::*;

    fn args(tenant_uuid: Option<Uuid>) -> CreateTenantArgs {
        CreateTenantArgs {
            name: "Corner Shop".to_string(),
            tenant_uuid,
            database: DatabaseArgs {
                database_url: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn prints_the_created_tenant() -> TestResult {
        let uuid = Uuid::now_v7();

        let mut service = MockTenantsService::new();

        service
            .expect_create_tenant()
            .once()
            .withf(move |new| new.uuid.into_uuid() == uuid && new.name == "Corner Shop")
            .return_once(|new| {
                Ok(TenantRecord {
                    uuid: new.uuid,
                    name: new.name,
                    created_at: Timestamp::now(),
                    updated_at: Timestamp::now(),
                    deleted_at: None,
                })
            });

        let mut out = Vec::new();

        execute(&service, args(Some(uuid)), &mut out).await?;

        let text = String::from_utf8(out)?;

        assert!(text.contains(&uuid.to_string()));
        assert!(text.contains("Corner Shop"));

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_tenant_is_reported() {
        let mut service = MockTenantsService::new();

        service
            .expect_create_tenant()
            .once()
            .return_once(|_| Err(TenantsServiceError::AlreadyExists));

        let result = execute(&service, args(None), &mut Vec::new()).await;

        assert!(result.is_err_and(|error| error.starts_with("failed to create tenant")));
    }
}
