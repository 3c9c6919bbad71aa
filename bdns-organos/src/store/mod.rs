//! Administrative unit store
//!
//! The engine addresses the hierarchy through [`OrganoStore`]: point
//! lookup, two filtered scans, root lookup and insert. Backends:
//! - [`SqliteStore`]: wraps a caller-owned connection, normally an open
//!   transaction, so the caller decides the unit of work
//! - [`MemoryStore`]: ordered map, for dry runs
//!
//! Every backend returns multiple matches lowest id first (byte order).
//!
//! The upserter's check-then-insert is only race-free when concurrent
//! writers work on disjoint id prefixes or the backend serializes their
//! transactions; no locking happens at this level.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::{OrganoError, Result};
use crate::models::{NodeId, NodeType, Organo};
use async_trait::async_trait;
use std::collections::HashSet;

/// Storage operations the engine needs
#[async_trait]
pub trait OrganoStore: Send {
    /// Point lookup by id
    async fn get(&mut self, id: &NodeId) -> Result<Option<Organo>>;

    /// First node whose normalized levels match
    ///
    /// `level1` always participates; `None` for level 2 or 3 is a wildcard.
    async fn find_by_levels(
        &mut self,
        level1: &str,
        level2: Option<&str>,
        level3: Option<&str>,
    ) -> Result<Option<NodeId>>;

    /// Nodes of `node_type` with normalized name `name_norm`, optionally
    /// restricted to a normalized `level3`
    async fn find_by_name(
        &mut self,
        node_type: NodeType,
        name_norm: &str,
        level3: Option<&str>,
    ) -> Result<Vec<Organo>>;

    /// The parentless node, if one exists
    async fn find_root(&mut self) -> Result<Option<Organo>>;

    /// Insert a node whose id is not yet taken
    async fn insert(&mut self, node: &Organo) -> Result<()>;

    /// Number of stored nodes
    async fn count(&mut self) -> Result<u64>;
}

/// The node followed by its ancestors up to the root
///
/// Returns an empty chain for an unknown id. Fails with
/// [`OrganoError::Cycle`] if a parent repeats and with an invariant
/// violation if a parent is missing.
pub async fn ancestors<S>(store: &mut S, id: &NodeId) -> Result<Vec<Organo>>
where
    S: OrganoStore + ?Sized,
{
    let mut chain: Vec<Organo> = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(id.clone());

    while let Some(cursor) = current {
        if !seen.insert(cursor.clone()) {
            return Err(OrganoError::Cycle(cursor.to_string()));
        }

        let node = match store.get(&cursor).await? {
            Some(node) => node,
            None if chain.is_empty() => return Ok(chain),
            None => {
                let child = chain.last().map(|n| n.id().to_string()).unwrap_or_default();
                return Err(OrganoError::InvariantViolation {
                    id: child,
                    reason: format!("parent {} does not exist", cursor),
                });
            }
        };

        current = node.parent_id().cloned();
        chain.push(node);
    }

    Ok(chain)
}
