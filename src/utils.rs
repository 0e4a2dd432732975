// ABOUTME: Utility functions for tool discovery and log-safe identifiers
// ABOUTME: Checks that pg_dump is installed and sanitizes names before logging

use crate::error::{DbUriError, Result};
use crate::migration::PG_DUMP;
use which::which;

/// Check that the PostgreSQL client tools used by this crate are available
///
/// Verifies that `pg_dump` is installed and in PATH.
///
/// # Errors
///
/// Returns [`DbUriError::ExternalTool`] with installation instructions if the
/// tool is missing.
///
/// # Examples
///
/// ```
/// # use pg_dburi::utils::check_required_tools;
/// if check_required_tools().is_err() {
///     eprintln!("pg_dump is not installed");
/// }
/// ```
pub fn check_required_tools() -> Result<()> {
    if which(PG_DUMP).is_err() {
        return Err(DbUriError::ExternalTool {
            tool: PG_DUMP.to_string(),
            reason: "Missing required PostgreSQL client tool".to_string(),
            stderr: "Please install PostgreSQL client tools:\n\
                     - Ubuntu/Debian: sudo apt-get install postgresql-client\n\
                     - macOS: brew install postgresql\n\
                     - RHEL/CentOS: sudo yum install postgresql\n\
                     - Windows: Download from https://www.postgresql.org/download/windows/"
                .to_string(),
        });
    }

    Ok(())
}

/// Sanitize an identifier (database name, query text) for display
///
/// Removes control characters and limits length to prevent log injection and
/// keep messages readable.
///
/// **Note**: This is for display purposes only. It does not make an
/// identifier safe to splice into SQL.
///
/// # Examples
///
/// ```
/// # use pg_dburi::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("normal_db"), "normal_db");
/// assert_eq!(sanitize_identifier("db\nname"), "dbname");
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}
