//! Batch import of listing trees into the store
//!
//! One call imports one administration kind. Nodes are upserted
//! root-to-leaf; each child is attached to the id its parent actually
//! received, which differs from the listing id when the parent was
//! disambiguated.
//!
//! Per-node problems (blank names, exhausted suffixes, a parent that was
//! itself skipped) are counted and logged. Invariant violations and
//! database errors abort the batch; the caller rolls back its transaction.

use crate::error::{OrganoError, Result};
use crate::listing::{flatten, AdminKind, ListingEntry, ParentRef};
use crate::models::{Levels, NodeId, NodeType, Organo};
use crate::normalize::normalize_str;
use crate::store::OrganoStore;
use crate::upsert::{UpsertOutcome, Upserter};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{error, info, warn};

/// Display name of the geographic root
pub const ROOT_NAME: &str = "ESTADO";

/// Per-batch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub inserted: usize,
    pub unchanged: usize,
    pub disambiguated: usize,
    pub failed: usize,
}

impl ImportStats {
    fn record(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted(_) => self.inserted += 1,
            UpsertOutcome::Unchanged(_) => self.unchanged += 1,
            UpsertOutcome::Disambiguated { .. } => self.disambiguated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.unchanged + self.disambiguated + self.failed
    }

    pub fn merge(&mut self, other: &ImportStats) {
        self.inserted += other.inserted;
        self.unchanged += other.unchanged;
        self.disambiguated += other.disambiguated;
        self.failed += other.failed;
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} unchanged, {} disambiguated, {} failed",
            self.inserted, self.unchanged, self.disambiguated, self.failed
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Importer {
    upserter: Upserter,
}

impl Importer {
    pub fn new(upserter: Upserter) -> Self {
        Self { upserter }
    }

    /// Id of the geographic root, creating `G0` "ESTADO" if absent
    pub async fn ensure_root<S>(&self, store: &mut S) -> Result<NodeId>
    where
        S: OrganoStore + ?Sized,
    {
        if let Some(root) = store.find_root().await? {
            return Ok(root.id().clone());
        }

        let root = Organo::new(
            NodeId::compose(NodeType::Geographic, 0)?,
            None,
            ROOT_NAME,
            NodeType::Geographic,
            Levels::default(),
        )?;
        let id = self.upserter.insert_or_resolve(store, root).await?;
        info!(id = %id, "Created geographic root");
        Ok(id)
    }

    /// Import one administration kind's listing
    pub async fn import<S>(
        &self,
        store: &mut S,
        kind: AdminKind,
        entries: &[ListingEntry],
    ) -> Result<ImportStats>
    where
        S: OrganoStore + ?Sized,
    {
        let root = self.ensure_root(store).await?;
        let plan = flatten(kind, entries);
        info!(kind = %kind, nodes = plan.len(), "Importing listing");

        let mut stats = ImportStats::default();
        let mut assigned: Vec<Option<NodeId>> = Vec::with_capacity(plan.len());
        let mut communities: HashMap<String, NodeId> = HashMap::new();

        for planned in plan {
            let parent = match &planned.parent {
                ParentRef::Root => Some(root.clone()),
                ParentRef::Planned(idx) => assigned.get(*idx).cloned().flatten(),
                ParentRef::Community(name) => {
                    if !communities.contains_key(name) {
                        let id = find_community(store, &root, name).await?;
                        communities.insert(name.clone(), id);
                    }
                    communities.get(name).cloned()
                }
            };
            let listing_id = planned.listing_id;

            let Some(parent) = parent else {
                warn!(kind = %kind, listing_id, "Skipping node whose parent was not imported");
                stats.failed += 1;
                assigned.push(None);
                continue;
            };

            let candidate = planned.id().and_then(|id| {
                Organo::new(
                    id,
                    Some(parent),
                    planned.name,
                    planned.node_type,
                    planned.levels,
                )
            });
            let candidate = match candidate {
                Ok(node) => node,
                Err(e) => {
                    warn!(kind = %kind, listing_id, "Skipping listing entry: {}", e);
                    stats.failed += 1;
                    assigned.push(None);
                    continue;
                }
            };

            match self.upserter.upsert(store, candidate).await {
                Ok(outcome) => {
                    stats.record(&outcome);
                    assigned.push(Some(outcome.into_id()));
                }
                Err(e @ OrganoError::SuffixExhausted { .. }) => {
                    warn!(kind = %kind, listing_id, "Skipping listing entry: {}", e);
                    stats.failed += 1;
                    assigned.push(None);
                }
                Err(e) => {
                    error!(kind = %kind, listing_id, "Aborting import: {}", e);
                    return Err(e);
                }
            }
        }

        info!(kind = %kind, "Import finished: {}", stats);
        Ok(stats)
    }
}

/// Community node (GEOGRAPHIC, directly under the root) with this name;
/// the root itself when the regional listing has not created it
async fn find_community<S>(store: &mut S, root: &NodeId, name: &str) -> Result<NodeId>
where
    S: OrganoStore + ?Sized,
{
    let found = match normalize_str(name) {
        Some(norm) => store
            .find_by_name(NodeType::Geographic, &norm, None)
            .await?
            .into_iter()
            .find(|node| node.parent_id() == Some(root)),
        None => None,
    };

    match found {
        Some(node) => Ok(node.id().clone()),
        None => {
            warn!(
                community = %name,
                "Community not found, attaching its provinces to the root"
            );
            Ok(root.clone())
        }
    }
}
