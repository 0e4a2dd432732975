// ABOUTME: Shared helpers for tests that need a live PostgreSQL server
// ABOUTME: Reads TEST_PG_HOST, TEST_PG_PORT, TEST_PG_USER and PGPASSWORD

use crate::postgres::DbUri;
use std::env;

/// Descriptor for the `postgres` database on the test server
pub(crate) fn test_server() -> DbUri {
    let host = env::var("TEST_PG_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("TEST_PG_PORT").unwrap_or_else(|_| "5432".to_string());
    let user = env::var("TEST_PG_USER").unwrap_or_else(|_| "postgres".to_string());
    DbUri::new(host, port, "postgres", user, "").expect("PGPASSWORD must be set")
}
