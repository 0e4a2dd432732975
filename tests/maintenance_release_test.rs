// ABOUTME: Integration test for maintenance connection release against a live server
// ABOUTME: Kept in its own binary so no other test opens sessions while it counts

use pg_dburi::postgres::{DbUri, MAINTENANCE_DATABASE};
use pg_dburi::query::query_scalar;
use pg_dburi::DbUriError;
use std::env;
use std::time::Duration;
use tokio_postgres::Client;

fn test_uri() -> DbUri {
    let host = env::var("TEST_PG_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("TEST_PG_PORT").unwrap_or_else(|_| "5432".to_string());
    let user = env::var("TEST_PG_USER").unwrap_or_else(|_| "postgres".to_string());
    DbUri::new(host, port, "postgres", user, "").expect("PGPASSWORD must be set")
}

/// Sessions on the maintenance database other than the watcher itself
async fn other_sessions(watcher: &Client) -> i64 {
    query_scalar(
        watcher,
        "SELECT count(*) FROM pg_stat_activity \
         WHERE datname = $1 AND pid <> pg_backend_pid()",
        &[&MAINTENANCE_DATABASE],
    )
    .await
    .unwrap()
}

/// Backends exit shortly after their client disconnects
async fn settle(watcher: &Client, baseline: i64) -> i64 {
    let mut count = other_sessions(watcher).await;
    for _ in 0..50 {
        if count <= baseline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        count = other_sessions(watcher).await;
    }
    count
}

#[tokio::test]
#[ignore]
async fn test_failed_creates_release_maintenance_connections() {
    let uri = test_uri();
    let name = "pg_dburi_it_release";

    uri.drop_database(name).await.unwrap();
    uri.create_database(name).await.unwrap();

    let watcher = uri.maintenance().open().await.unwrap();
    let before = settle(&watcher, 0).await;

    for _ in 0..5 {
        let result = uri.create_database(name).await;
        assert!(
            matches!(result, Err(DbUriError::Statement { .. })),
            "{:?}",
            result
        );
    }

    let after = settle(&watcher, before).await;
    assert_eq!(after, before, "maintenance connections left open");

    uri.drop_database(name).await.unwrap();
}
