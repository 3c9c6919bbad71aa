//! Conflict-aware upserter
//!
//! Nodes are never overwritten. A candidate whose id is taken by a node
//! with different content is stored under the first free `{id}_{n}`.
//! Re-importing a candidate identical to a stored variant returns that
//! variant, so repeated imports create nothing new.
//!
//! The check-then-insert sequence assumes the store serializes writers
//! (one transaction per batch, disjoint id prefixes across batches).

use crate::error::{OrganoError, Result};
use crate::models::{NodeId, NodeType, Organo};
use crate::store::OrganoStore;
use bdns_common::config::UpsertConfig;
use tracing::{debug, warn};

/// Default bound on the `_n` suffix walk
pub const DEFAULT_MAX_SUFFIX: u32 = 1000;

/// What happened to a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Stored under its own id
    Inserted(NodeId),
    /// An identical node already existed under this id
    Unchanged(NodeId),
    /// Its id was taken by a different node; stored under a suffixed id
    Disambiguated { original: NodeId, id: NodeId },
}

impl UpsertOutcome {
    /// The id the candidate ended up under
    pub fn id(&self) -> &NodeId {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Unchanged(id) => id,
            UpsertOutcome::Disambiguated { id, .. } => id,
        }
    }

    pub fn into_id(self) -> NodeId {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Unchanged(id) => id,
            UpsertOutcome::Disambiguated { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Upserter {
    max_suffix: u32,
}

impl Default for Upserter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUFFIX)
    }
}

impl Upserter {
    pub fn new(max_suffix: u32) -> Self {
        Self { max_suffix }
    }

    pub fn from_config(config: &UpsertConfig) -> Self {
        Self::new(config.max_suffix)
    }

    /// Insert `candidate`, returning the id finally used
    pub async fn insert_or_resolve<S>(&self, store: &mut S, candidate: Organo) -> Result<NodeId>
    where
        S: OrganoStore + ?Sized,
    {
        Ok(self.upsert(store, candidate).await?.into_id())
    }

    /// Insert `candidate` and report how its id was settled
    ///
    /// Walks `id`, `id_1`, `id_2`, … up to the configured bound:
    /// - free id: validate placement, insert, done
    /// - same content: nothing written, done
    /// - different content: log the conflict, try the next suffix
    ///
    /// Placement errors (missing parent, second or non-geographic root)
    /// are [`OrganoError::InvariantViolation`] and leave the store untouched.
    pub async fn upsert<S>(&self, store: &mut S, mut candidate: Organo) -> Result<UpsertOutcome>
    where
        S: OrganoStore + ?Sized,
    {
        let original = candidate.id().clone();

        for n in 0..=self.max_suffix {
            let id = if n == 0 {
                original.clone()
            } else {
                original.with_suffix(n)
            };

            let Some(existing) = store.get(&id).await? else {
                candidate.set_id(id.clone());
                validate_placement(store, &candidate).await?;
                store.insert(&candidate).await?;

                return Ok(if n == 0 {
                    debug!(id = %id, "Inserted node");
                    UpsertOutcome::Inserted(id)
                } else {
                    debug!(original = %original, id = %id, "Inserted disambiguated node");
                    UpsertOutcome::Disambiguated { original, id }
                });
            };

            let diffs = existing.diff(&candidate);
            if diffs.is_empty() {
                debug!(id = %id, "Node unchanged");
                return Ok(UpsertOutcome::Unchanged(id));
            }

            let changes: Vec<String> = diffs.iter().map(ToString::to_string).collect();
            warn!(
                id = %id,
                changes = %changes.join("; "),
                "Conflicting node data, keeping existing node"
            );
        }

        Err(OrganoError::SuffixExhausted {
            base: original.to_string(),
            attempts: self.max_suffix + 1,
        })
    }
}

/// Parent must exist; a parentless node must be the single GEOGRAPHIC root
async fn validate_placement<S>(store: &mut S, node: &Organo) -> Result<()>
where
    S: OrganoStore + ?Sized,
{
    match node.parent_id() {
        Some(parent) => {
            if store.get(parent).await?.is_none() {
                return Err(OrganoError::InvariantViolation {
                    id: node.id().to_string(),
                    reason: format!("parent {} does not exist", parent),
                });
            }
        }
        None => {
            if node.node_type() != NodeType::Geographic {
                return Err(OrganoError::InvariantViolation {
                    id: node.id().to_string(),
                    reason: format!("{} node without parent", node.node_type()),
                });
            }
            if let Some(root) = store.find_root().await? {
                return Err(OrganoError::InvariantViolation {
                    id: node.id().to_string(),
                    reason: format!("root {} already exists", root.id()),
                });
            }
        }
    }
    Ok(())
}
