//! Test helper utilities
//!
//! Shared setup for bdns-organos integration tests

#![allow(dead_code)]

pub mod log_capture;

use anyhow::Result;
use bdns_common::db::init_database;
use bdns_organos::models::Levels;
use bdns_organos::{NodeId, NodeType, Organo};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create an on-disk test database with the schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_bdns.db");
    let pool = init_database(&db_path).await?;
    Ok((temp_dir, pool))
}

/// Build a node, panicking on invalid input
pub fn node(
    id: &str,
    parent: Option<&str>,
    name: &str,
    node_type: NodeType,
    levels: &[&str],
) -> Organo {
    Organo::new(
        NodeId::parse(id).unwrap(),
        parent.map(|p| NodeId::parse(p).unwrap()),
        name,
        node_type,
        Levels::path(levels),
    )
    .unwrap()
}

pub fn id(raw: &str) -> NodeId {
    NodeId::parse(raw).unwrap()
}

/// Rows in the organo table
pub async fn count_nodes(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM organo")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Read a listing fixture from tests/fixtures
pub fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Cannot read fixture {}: {}", path.display(), e))
}
