//! In-memory store
//!
//! Linear scans over an ordered map. Used for `populate --dry-run`.

use crate::error::{OrganoError, Result};
use crate::models::{NodeId, NodeType, Organo};
use crate::store::OrganoStore;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: BTreeMap<NodeId, Organo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganoStore for MemoryStore {
    async fn get(&mut self, id: &NodeId) -> Result<Option<Organo>> {
        Ok(self.nodes.get(id).cloned())
    }

    async fn find_by_levels(
        &mut self,
        level1: &str,
        level2: Option<&str>,
        level3: Option<&str>,
    ) -> Result<Option<NodeId>> {
        let found = self.nodes.values().find(|node| {
            node.level1_norm() == Some(level1)
                && level2.map_or(true, |l2| node.level2_norm() == Some(l2))
                && level3.map_or(true, |l3| node.level3_norm() == Some(l3))
        });
        Ok(found.map(|node| node.id().clone()))
    }

    async fn find_by_name(
        &mut self,
        node_type: NodeType,
        name_norm: &str,
        level3: Option<&str>,
    ) -> Result<Vec<Organo>> {
        Ok(self
            .nodes
            .values()
            .filter(|node| {
                node.node_type() == node_type
                    && node.name_norm() == name_norm
                    && level3.map_or(true, |l3| node.level3_norm() == Some(l3))
            })
            .cloned()
            .collect())
    }

    async fn find_root(&mut self) -> Result<Option<Organo>> {
        Ok(self.nodes.values().find(|node| node.is_root()).cloned())
    }

    async fn insert(&mut self, node: &Organo) -> Result<()> {
        if self.nodes.contains_key(node.id()) {
            return Err(OrganoError::InvariantViolation {
                id: node.id().to_string(),
                reason: "id already stored".to_string(),
            });
        }
        self.nodes.insert(node.id().clone(), node.clone());
        Ok(())
    }

    async fn count(&mut self) -> Result<u64> {
        Ok(self.nodes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Levels;
    use crate::store::ancestors;

    fn node(id: &str, parent: Option<&str>, name: &str, levels: &[&str]) -> Organo {
        Organo::new(
            NodeId::parse(id).unwrap(),
            parent.map(|p| NodeId::parse(p).unwrap()),
            name,
            NodeType::Central,
            Levels::path(levels),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lowest_id_wins() {
        let mut store = MemoryStore::new();
        store.insert(&node("C9", None, "A", &["ESTADO", "X"])).await.unwrap();
        store.insert(&node("C10", None, "B", &["ESTADO", "X"])).await.unwrap();

        let found = store.find_by_levels("ESTADO", Some("X"), None).await.unwrap();
        assert_eq!(found.unwrap().as_str(), "C10");
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let mut store = MemoryStore::new();
        store.insert(&node("C1", None, "A", &[])).await.unwrap();
        assert!(store.insert(&node("C1", None, "B", &[])).await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ancestor_chain() {
        let mut store = MemoryStore::new();
        store.insert(&node("G0", None, "ESTADO", &[])).await.unwrap();
        store.insert(&node("C3", Some("G0"), "MIN", &[])).await.unwrap();
        store.insert(&node("C3_1", Some("C3"), "DG", &[])).await.unwrap();

        let chain = ancestors(&mut store, &NodeId::parse("C3_1").unwrap())
            .await
            .unwrap();
        let ids: Vec<_> = chain.iter().map(|n| n.id().as_str()).collect();
        assert_eq!(ids, vec!["C3_1", "C3", "G0"]);

        let unknown = ancestors(&mut store, &NodeId::parse("C404").unwrap())
            .await
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_ancestor_chain_reports_dangling_parent() {
        let mut store = MemoryStore::new();
        // Bypasses the upserter, which would refuse this node
        store.insert(&node("C5", Some("C4"), "ORPHAN", &[])).await.unwrap();

        let err = ancestors(&mut store, &NodeId::parse("C5").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[tokio::test]
    async fn test_ancestor_chain_detects_cycle() {
        let mut store = MemoryStore::new();
        store.insert(&node("C1", Some("C2"), "ONE", &[])).await.unwrap();
        store.insert(&node("C2", Some("C1"), "TWO", &[])).await.unwrap();

        let err = ancestors(&mut store, &NodeId::parse("C1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, OrganoError::Cycle(_)));
    }
}
