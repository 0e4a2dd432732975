// ABOUTME: Server-level administration through the maintenance database
// ABOUTME: Creates and drops databases and terminates pglogical backends

use crate::error::{DbUriError, Result};
use crate::postgres::DbUri;
use crate::utils::sanitize_identifier;
use tokio_postgres::Client;

/// Backends whose application_name starts with this are replication workers
const REPLICATION_APPLICATION_PATTERN: &str = "pglogical%";

impl DbUri {
    /// Create a database on this server
    ///
    /// `name` is concatenated into the statement unquoted and must come from a
    /// trusted source. An existing database is reported as an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbUriError::Connection`] if the maintenance connection cannot
    /// be opened and [`DbUriError::Statement`] if `CREATE DATABASE` fails.
    pub async fn create_database(&self, name: &str) -> Result<()> {
        tracing::info!("Creating database '{}'...", sanitize_identifier(name));

        let client = self.open_maintenance_connection().await?;
        execute_statement(&client, &format!("create database {}", name)).await?;

        tracing::info!("✓ Database '{}' created", sanitize_identifier(name));
        Ok(())
    }

    /// Drop a database on this server if it exists
    ///
    /// `name` is concatenated into the statement unquoted and must come from a
    /// trusted source.
    pub async fn drop_database(&self, name: &str) -> Result<()> {
        tracing::info!("Dropping database '{}'...", sanitize_identifier(name));

        let client = self.open_maintenance_connection().await?;
        execute_statement(&client, &format!("drop database if exists {}", name)).await?;

        tracing::info!("✓ Database '{}' dropped", sanitize_identifier(name));
        Ok(())
    }

    /// Terminate every backend registered by a pglogical worker
    ///
    /// Returns how many backends were signalled. A backend that exits between
    /// being listed and being terminated is not counted and is not an error.
    pub async fn terminate_replication_backends(&self) -> Result<u64> {
        tracing::info!("Terminating pglogical backends on {}...", self.host());

        let client = self.open_maintenance_connection().await?;
        let terminated = execute_statement(&client, &terminate_statement()).await?;

        tracing::info!("✓ Signalled {} pglogical backend(s)", terminated);
        Ok(terminated)
    }
}

/// One row per backend that `pg_terminate_backend` reported as signalled
fn terminate_statement() -> String {
    // OFFSET 0 keeps the LIKE filter from being merged with the termination
    format!(
        "SELECT pid FROM (\
             SELECT pid, pg_terminate_backend(pid) AS signalled \
             FROM pg_stat_activity \
             WHERE application_name LIKE '{}' AND pid <> pg_backend_pid() \
             OFFSET 0\
         ) AS backends WHERE signalled",
        REPLICATION_APPLICATION_PATTERN
    )
}

async fn execute_statement(client: &Client, statement: &str) -> Result<u64> {
    client
        .execute(statement, &[])
        .await
        .map_err(|source| DbUriError::Statement {
            statement: statement.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unreachable port on loopback so connecting fails fast
    fn unreachable_server() -> DbUri {
        DbUri::from_parts("127.0.0.1", "1", "app", "nobody", "nothing")
    }

    #[test]
    fn test_terminate_statement_counts_only_signalled_backends() {
        assert_eq!(
            terminate_statement(),
            "SELECT pid FROM (SELECT pid, pg_terminate_backend(pid) AS signalled \
             FROM pg_stat_activity \
             WHERE application_name LIKE 'pglogical%' AND pid <> pg_backend_pid() \
             OFFSET 0) AS backends WHERE signalled"
        );
    }

    #[tokio::test]
    async fn test_create_database_reports_connection_failure() {
        let result = unreachable_server().create_database("never_created").await;
        assert!(matches!(result, Err(DbUriError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_drop_database_reports_connection_failure() {
        let result = unreachable_server().drop_database("never_created").await;
        assert!(matches!(result, Err(DbUriError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_terminate_reports_connection_failure() {
        let result = unreachable_server().terminate_replication_backends().await;
        assert!(matches!(result, Err(DbUriError::Connection { .. })));
    }
}
