//! Per-test Postgres databases in one shared container

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

pub(super) const SUPERUSER: &str = "cartwright_test";
pub(super) const SUPERUSER_PASSWORD: &str = "cartwright_test_password";

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Databases waiting to be dropped.
static DROP_QUEUE: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

/// Reject names that cannot be interpolated into `CREATE DATABASE` safely.
fn validate_database_name(name: &str) -> Result<(), String> {
    const RESERVED: [&str; 8] = [
        "user", "table", "select", "database", "schema", "role", "grant", "postgres",
    ];

    if name.is_empty() || name.len() > 63 {
        return Err(format!("database name must be 1-63 characters, got {}", name.len()));
    }

    if !name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    {
        return Err("database name must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("database name may only contain letters, digits and underscores".to_string());
    }

    if RESERVED.iter().any(|word| name.eq_ignore_ascii_case(word)) {
        return Err(format!("database name {name:?} is reserved"));
    }

    Ok(())
}

fn server_url(host: &str, port: u16, database: &str) -> String {
    format!("postgresql://{SUPERUSER}:{SUPERUSER_PASSWORD}@{host}:{port}/{database}")
}

fn container_host() -> String {
    std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string())
}

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(SUPERUSER)
        .with_password(SUPERUSER_PASSWORD)
        .with_db_name("cartwright_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("failed to start the Postgres container")
}

async fn start_drop_queue() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                eprintln!("failed to drop test database {name}: {error}");
            }
        }
    });

    sender
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    validate_database_name(name).map_err(sqlx::Error::Protocol)?;

    let Some(container) = POSTGRES_CONTAINER.get() else {
        return Ok(());
    };

    let Ok(port) = container.get_host_port_ipv4(5432).await else {
        return Ok(());
    };

    let mut conn = PgConnection::connect(&server_url(&container_host(), port, "postgres")).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// A freshly migrated database of its own, dropped when the value goes away.
///
/// Services commit their transactions for real, so isolation comes from
/// giving every test its own database rather than from rollback.
#[derive(Debug)]
pub struct TestDb {
    pool: PgPool,
    pub(super) name: String,
    pub(super) url: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(queue) = DROP_QUEUE.get() {
            let _ = queue.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        let name = format!("cartwright_{}", uuid::Uuid::now_v7().simple());

        Self::named(&name).await
    }

    pub async fn named(name: &str) -> Self {
        DROP_QUEUE.get_or_init(start_drop_queue).await;

        if let Err(error) = validate_database_name(name) {
            panic!("invalid test database name {name:?}: {error}");
        }

        let container = POSTGRES_CONTAINER.get_or_init(start_container).await;

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("failed to read the container port");

        let host = container_host();

        let mut admin = PgConnection::connect(&server_url(&host, port, "postgres"))
            .await
            .expect("failed to connect to the maintenance database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .await
            .expect("failed to create the test database");

        admin.close().await.expect("failed to close admin connection");

        let url = server_url(&host, port, name);

        let pool = PgPool::connect(&url)
            .await
            .expect("failed to connect to the test database");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("failed to run migrations");

        Self {
            pool,
            name: name.to_string(),
            url,
        }
    }

    /// Superuser pool. Bypasses row-level security.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_style_names_are_accepted() {
        assert!(validate_database_name("cartwright_0190a1b2c3d4").is_ok());
        assert!(validate_database_name("_scratch").is_ok());
    }

    #[test]
    fn names_that_need_quoting_are_rejected() {
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
        assert!(validate_database_name("9lives").is_err());
        assert!(validate_database_name("drop\"; --").is_err());
        assert!(validate_database_name("with-hyphen").is_err());
        assert!(validate_database_name("db$dollar").is_err());
    }

    #[test]
    fn reserved_words_are_rejected_in_any_case() {
        assert!(validate_database_name("user").is_err());
        assert!(validate_database_name("Postgres").is_err());
    }

    #[tokio::test]
    async fn migrations_create_the_pricing_tables() {
        let db = TestDb::new().await;

        let tables: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_schema = 'public' \
             AND table_name IN ('carts', 'shipping_rates', 'tax_rules', 'coupons')",
        )
        .fetch_one(db.pool())
        .await
        .expect("failed to count tables");

        assert_eq!(tables, 4);
    }
}
