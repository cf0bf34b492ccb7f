//! Database migration runner
//!
//! Migrations live in the workspace-level `migrations/` directory and are
//! embedded into the binary at compile time by `sqlx::migrate!`.

use sqlx::postgres::PgPool;
use tracing::{debug, info, warn};

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,

    /// Number of embedded migrations not applied yet
    pub pending_migrations: usize,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending_migrations == 0
    }
}

/// Runs all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations completed");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Reports applied and pending migrations
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let embedded = sqlx::migrate!("../migrations").iter().count();

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            pending_migrations: embedded,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    let applied = usize::try_from(count).unwrap_or_default();

    Ok(MigrationStatus {
        applied_migrations: applied,
        latest_version,
        pending_migrations: embedded.saturating_sub(applied),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_present() {
        let migrator = sqlx::migrate!("../migrations");
        assert!(migrator.iter().count() >= 1);
    }

    #[test]
    fn test_up_to_date() {
        let status = MigrationStatus {
            applied_migrations: 1,
            latest_version: Some(20250101000000),
            pending_migrations: 0,
        };
        assert!(status.is_up_to_date());
    }
}
