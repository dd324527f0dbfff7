use std::io;

use cartwright_app::domain::tenants::{TenantsService, records::TenantRecord};
use clap::Args;
use uuid::Uuid;

use crate::cli::{args::DatabaseArgs, render};

#[derive(Debug, Args)]
pub(crate) struct ShowTenantArgs {
    #[arg(long)]
    tenant_uuid: Uuid,

    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: ShowTenantArgs) -> Result<(), String> {
    let app = args.database.connect().await?;

    execute(app.tenants.as_ref(), args.tenant_uuid, &mut io::stdout()).await
}

async fn execute(
    service: &dyn TenantsService,
    tenant_uuid: Uuid,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let tenant = service
        .get_tenant(tenant_uuid.into())
        .await
        .map_err(|error| format!("failed to load tenant {tenant_uuid}: {error}"))?;

    write_tenant(out, &tenant).map_err(render::io_error)
}

pub(super) fn write_tenant(out: &mut impl io::Write, tenant: &TenantRecord) -> io::Result<()> {
    render::write_summary(
        out,
        &[
            ("tenant_uuid:", tenant.uuid.to_string()),
            ("tenant_name:", tenant.name.clone()),
            ("created_at:", tenant.created_at.to_string()),
        ],
    )
}
