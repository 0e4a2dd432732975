// ABOUTME: Error type shared by connection descriptors and result reducers
// ABOUTME: Every variant carries the query, statement or tool that produced it

use std::error::Error as StdError;

/// Boxed error used where the underlying failure may come from several crates
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum DbUriError {
    /// No password was given and none could be resolved
    #[error("{variable} not present in env vars and no password was supplied")]
    MissingCredential { variable: &'static str },

    /// The rendered connection URI could not be parsed back into parameters
    #[error("Malformed connection URI: {source}")]
    MalformedUri {
        #[source]
        source: tokio_postgres::Error,
    },

    /// Opening or pinging a connection failed
    #[error("{message}: {source}")]
    Connection {
        message: String,
        #[source]
        source: BoxError,
    },

    /// A query sent through a reducer failed to execute
    #[error("Query failed: {query}: {source}")]
    Query {
        query: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// A DDL or administrative statement failed
    #[error("Statement failed: {statement}: {source}")]
    Statement {
        statement: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// A column value could not be converted into the requested scalar type
    #[error("Cannot decode column '{column}' as {expected}: {reason}")]
    Decode {
        column: String,
        expected: &'static str,
        reason: String,
    },

    /// The result had a row or value count outside what the caller expects
    #[error("Query returned {actual} {unit}, expected {expected}: {query}")]
    Cardinality {
        query: String,
        unit: &'static str,
        actual: usize,
        expected: &'static str,
    },

    /// The result rows had a width other than the single column expected
    #[error("Query returned rows with {actual} columns, expected {expected}: {query}")]
    Shape {
        query: String,
        actual: usize,
        expected: usize,
    },

    /// An external client tool could not be launched or exited with failure
    #[error("{tool} failed: {reason}{}", format_stderr(.stderr))]
    ExternalTool {
        tool: String,
        reason: String,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, DbUriError>;

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}
