//! SQLite backend for the `organo` table
//!
//! Borrows a connection instead of owning a pool: pass `&mut *tx` to run
//! a whole batch inside one transaction.

use crate::error::Result;
use crate::models::{Levels, NodeId, NodeType, Organo};
use crate::store::OrganoStore;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

const NODE_COLUMNS: &str = "id, parent_id, name, node_type, level1, level2, level3";

/// Store over a borrowed SQLite connection or transaction
pub struct SqliteStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

/// Rebuild a node from its raw columns; normalized columns are recomputed
fn row_to_organo(row: &SqliteRow) -> Result<Organo> {
    let id: String = row.try_get("id")?;
    let parent_id: Option<String> = row.try_get("parent_id")?;
    let node_type: String = row.try_get("node_type")?;

    Organo::new(
        NodeId::parse(&id)?,
        parent_id.as_deref().map(NodeId::parse).transpose()?,
        row.try_get::<String, _>("name")?,
        node_type.parse::<NodeType>()?,
        Levels::new(
            row.try_get("level1")?,
            row.try_get("level2")?,
            row.try_get("level3")?,
        ),
    )
}

#[async_trait]
impl<'c> OrganoStore for SqliteStore<'c> {
    async fn get(&mut self, id: &NodeId) -> Result<Option<Organo>> {
        let row = sqlx::query(&format!("SELECT {} FROM organo WHERE id = ?", NODE_COLUMNS))
            .bind(id.as_str())
            .fetch_optional(&mut *self.conn)
            .await?;

        row.as_ref().map(row_to_organo).transpose()
    }

    async fn find_by_levels(
        &mut self,
        level1: &str,
        level2: Option<&str>,
        level3: Option<&str>,
    ) -> Result<Option<NodeId>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM organo WHERE level1_norm = ");
        query.push_bind(level1.to_string());
        if let Some(level2) = level2 {
            query.push(" AND level2_norm = ").push_bind(level2.to_string());
        }
        if let Some(level3) = level3 {
            query.push(" AND level3_norm = ").push_bind(level3.to_string());
        }
        query.push(" ORDER BY id LIMIT 1");

        let id: Option<String> = query
            .build_query_scalar()
            .fetch_optional(&mut *self.conn)
            .await?;

        id.as_deref().map(NodeId::parse).transpose()
    }

    async fn find_by_name(
        &mut self,
        node_type: NodeType,
        name_norm: &str,
        level3: Option<&str>,
    ) -> Result<Vec<Organo>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM organo WHERE node_type = ",
            NODE_COLUMNS
        ));
        query.push_bind(node_type.as_str());
        query.push(" AND name_norm = ").push_bind(name_norm.to_string());
        if let Some(level3) = level3 {
            query.push(" AND level3_norm = ").push_bind(level3.to_string());
        }
        query.push(" ORDER BY id");

        let rows = query.build().fetch_all(&mut *self.conn).await?;
        rows.iter().map(row_to_organo).collect()
    }

    async fn find_root(&mut self) -> Result<Option<Organo>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM organo WHERE parent_id IS NULL ORDER BY id LIMIT 1",
            NODE_COLUMNS
        ))
        .fetch_optional(&mut *self.conn)
        .await?;

        row.as_ref().map(row_to_organo).transpose()
    }

    async fn insert(&mut self, node: &Organo) -> Result<()> {
        let levels = node.levels();
        sqlx::query(
            r#"
            INSERT INTO organo (
                id, parent_id, name, name_norm, node_type,
                level1, level2, level3,
                level1_norm, level2_norm, level3_norm
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(node.id().as_str())
        .bind(node.parent_id().map(NodeId::as_str))
        .bind(node.name())
        .bind(node.name_norm())
        .bind(node.node_type().as_str())
        .bind(levels.level1.as_deref())
        .bind(levels.level2.as_deref())
        .bind(levels.level3.as_deref())
        .bind(node.level1_norm())
        .bind(node.level2_norm())
        .bind(node.level3_norm())
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn count(&mut self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organo")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count as u64)
    }
}
