// ABOUTME: Wrapper for pg_dump to export a database schema
// ABOUTME: Captures the public schema DDL of a descriptor's database as text

use crate::error::{DbUriError, Result};
use crate::postgres::DbUri;
use std::ffi::OsStr;
use tokio::process::Command;

/// Default schema dump executable, resolved through PATH
pub const PG_DUMP: &str = "pg_dump";

impl DbUri {
    /// Dump the DDL of the `public` schema using `pg_dump`
    ///
    /// Only the schema is exported (`-s`), never data. The tool's standard
    /// output is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DbUriError::ExternalTool`] if `pg_dump` cannot be launched,
    /// exits unsuccessfully, or writes output that is not UTF-8. The error
    /// carries whatever the tool printed on stderr.
    pub async fn dump_schema(&self) -> Result<String> {
        self.dump_schema_with(PG_DUMP).await
    }

    /// Dump the `public` schema using an alternate pg_dump-compatible executable
    pub async fn dump_schema_with(&self, program: impl AsRef<OsStr>) -> Result<String> {
        let program = program.as_ref();
        let tool = program.to_string_lossy().into_owned();
        tracing::info!(
            "Dumping public schema of database '{}' with {}",
            self.name(),
            tool
        );

        let output = Command::new(program)
            .arg("-s")
            .arg(format!("--dbname={}", self.to_uri()))
            .arg("--schema=public")
            .output()
            .await
            .map_err(|e| DbUriError::ExternalTool {
                tool: tool.clone(),
                reason: format!("failed to execute ({}). Is PostgreSQL client installed?", e),
                stderr: String::new(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(DbUriError::ExternalTool {
                tool,
                reason: output.status.to_string(),
                stderr,
            });
        }

        let schema = String::from_utf8(output.stdout).map_err(|e| DbUriError::ExternalTool {
            tool: tool.clone(),
            reason: format!("output is not valid UTF-8: {}", e),
            stderr,
        })?;

        tracing::info!("✓ Schema dumped successfully ({} bytes)", schema.len());
        Ok(schema)
    }
}
