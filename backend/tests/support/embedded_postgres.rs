//! Shared embedded PostgreSQL helpers for integration tests.
//!
//! Each test gets its own database cloned from a template that already has
//! the embedded Diesel migrations applied, so suites never see each other's
//! rows and never drift from the production schema.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use backend::domain::ports::UserPersistenceError;
use backend::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "moussia_template";
const PROVISION_RETRIES: usize = 5;
const RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, UserPersistenceError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| UserPersistenceError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// The process-wide embedded cluster, retried while it boots.
///
/// `PG_PASSWORD` is pinned first so a reused data directory keeps accepting
/// the password it was initialised with.
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster library spawns threads; the shared
        // handle is initialised at most once per process.
        unsafe {
            std::env::set_var("PG_PASSWORD", "moussia_embedded_test");
        }
    }
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= PROVISION_RETRIES => return Err(error),
            Err(_) => {
                std::thread::sleep(RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Creates or reuses a template database with the latest migrations applied.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, UserPersistenceError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| UserPersistenceError::query(format!("template check: {err:?}")))?;

    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| UserPersistenceError::query(format!("create template: {err:?}")))?;

        let url = cluster.connection().database_url(&template_name);
        run_migrations(&url).map_err(|err| UserPersistenceError::query(err.to_string()))?;
    }

    Ok(template_name)
}

/// Provisions a temporary database cloned from the migration template.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, UserPersistenceError> {
    let mut last_error = None;
    for attempt in 1..=PROVISION_RETRIES {
        let provisioned = ensure_template_database(cluster).and_then(|template| {
            let db_name = format!("test_{}", Uuid::new_v4());
            cluster
                .temporary_database_from_template(db_name.as_str(), template.as_str())
                .map_err(|error| {
                    UserPersistenceError::query(format!(
                        "create database from template: attempt {attempt}/{PROVISION_RETRIES}: {error:?}"
                    ))
                })
        });
        match provisioned {
            Ok(database) => return Ok(database),
            Err(error) => last_error = Some(error),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(RETRY_DELAY);
        }
    }

    Err(last_error.unwrap_or_else(|| {
        UserPersistenceError::query("create database from template: exhausted retries")
    }))
}
