//! Embedded PostgreSQL databases for the Diesel adapter suites.
//!
//! One cluster is shared per test binary. Each test gets its own database
//! cloned from a template that already carries every migration, so schema
//! setup runs once per migration set rather than once per test.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

use storefront::domain::ports::PersistenceError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "storefront_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, PersistenceError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| PersistenceError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// The process-wide cluster, started on first use.
///
/// `PG_PASSWORD` is pinned so a reused data directory keeps accepting the
/// password it was initialised with.
pub fn shared_cluster() -> BootstrapResult<&'static ClusterHandle> {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "storefront_embedded_test");
        }
    }
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= PROVISION_RETRIES => return Err(error),
            Err(_) => {
                std::thread::sleep(PROVISION_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Create the migrated template unless it already exists.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, PersistenceError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| PersistenceError::query(format!("template check: {err:?}")))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| PersistenceError::query(format!("create template: {err:?}")))?;
        let url = cluster.connection().database_url(&template_name);
        migrate_schema(&url)?;
    }
    Ok(template_name)
}

fn provision_attempt(
    cluster: &ClusterHandle,
    attempt: usize,
) -> Result<TemporaryDatabase, PersistenceError> {
    let template_name = ensure_template_database(cluster).map_err(|error| {
        PersistenceError::query(format!("attempt {attempt}/{PROVISION_RETRIES}: {error}"))
    })?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|error| {
            PersistenceError::query(format!(
                "create database from template: attempt {attempt}/{PROVISION_RETRIES}: {error:?}"
            ))
        })
}

/// A fresh, migrated database dropped when the handle goes out of scope.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, PersistenceError> {
    let mut last_error = None;
    for attempt in 1..=PROVISION_RETRIES {
        match provision_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = Some(error),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error.unwrap_or_else(|| {
        PersistenceError::query("create database from template: exhausted retries")
    }))
}

fn migrate_schema(url: &str) -> Result<(), PersistenceError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| PersistenceError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| PersistenceError::query(format!("migration: {err:?}")))?;
    Ok(())
}
