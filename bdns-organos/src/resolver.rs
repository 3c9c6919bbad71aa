//! Hierarchical resolver
//!
//! Maps free-text level1/level2/level3 values to a node id. Strategies,
//! tried in order:
//! 1. Exact: every provided level matches the node's normalized level,
//!    omitted levels are wildcards
//! 2. Local fallback: feeds that put the municipality in level1 and the
//!    town hall in level2; matches a LOCAL node by display name and
//!    `level3_norm`
//! 3. Term equivalence (opt-in): strategies 1 and 2 again with the
//!    co-official spellings of level2/level3 from [`crate::terms`]
//!
//! "No match" is `Ok(None)`, never an error.

use crate::error::Result;
use crate::models::{NodeId, NodeType};
use crate::normalize::normalize;
use crate::store::OrganoStore;
use crate::terms::term_variants;
use bdns_common::config::ResolverConfig;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    LocalFallback,
    TermEquivalence,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::LocalFallback => "local fallback",
            MatchStrategy::TermEquivalence => "term equivalence",
        };
        write!(f, "{}", s)
    }
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub id: NodeId,
    pub strategy: MatchStrategy,
}

/// Hierarchical resolver
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    term_equivalence: bool,
}

impl Resolver {
    /// Strict resolver: exact match plus local fallback
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            term_equivalence: config.term_equivalence,
        }
    }

    /// Enable or disable the multilingual retry
    pub fn with_term_equivalence(mut self, enabled: bool) -> Self {
        self.term_equivalence = enabled;
        self
    }

    /// Resolve raw level values to a node id
    pub async fn resolve<S>(
        &self,
        store: &mut S,
        level1: &str,
        level2: Option<&str>,
        level3: Option<&str>,
    ) -> Result<Option<NodeId>>
    where
        S: OrganoStore + ?Sized,
    {
        Ok(self
            .resolve_detailed(store, level1, level2, level3)
            .await?
            .map(|r| r.id))
    }

    /// Resolve and report which strategy matched
    pub async fn resolve_detailed<S>(
        &self,
        store: &mut S,
        level1: &str,
        level2: Option<&str>,
        level3: Option<&str>,
    ) -> Result<Option<Resolution>>
    where
        S: OrganoStore + ?Sized,
    {
        let Some(l1) = normalize(Some(level1)) else {
            debug!("Resolve skipped: empty level1");
            return Ok(None);
        };
        let l2 = normalize(level2);
        let l3 = normalize(level3);

        if let Some(id) = lookup(store, &l1, l2.as_deref(), l3.as_deref()).await? {
            return Ok(Some(found(id, MatchStrategy::Exact, &l1, &l2, &l3)));
        }

        if let Some(l2) = l2.as_deref() {
            if let Some(id) = local_fallback(store, &l1, l2).await? {
                return Ok(Some(found(
                    id,
                    MatchStrategy::LocalFallback,
                    &l1,
                    &Some(l2.to_string()),
                    &l3,
                )));
            }
        }

        if self.term_equivalence {
            if let Some(id) = self
                .term_equivalent_lookup(store, &l1, l2.as_deref(), l3.as_deref())
                .await?
            {
                return Ok(Some(found(id, MatchStrategy::TermEquivalence, &l1, &l2, &l3)));
            }
        }

        debug!(
            level1 = %l1,
            level2 = l2.as_deref().unwrap_or("-"),
            level3 = l3.as_deref().unwrap_or("-"),
            "No match"
        );
        Ok(None)
    }

    async fn term_equivalent_lookup<S>(
        &self,
        store: &mut S,
        l1: &str,
        l2: Option<&str>,
        l3: Option<&str>,
    ) -> Result<Option<NodeId>>
    where
        S: OrganoStore + ?Sized,
    {
        if let Some(l2) = l2 {
            for variant in term_variants(l2) {
                if let Some(id) = lookup(store, l1, Some(&variant), l3).await? {
                    return Ok(Some(id));
                }
                if let Some(id) = local_fallback(store, l1, &variant).await? {
                    return Ok(Some(id));
                }
            }
        }

        if let Some(l3) = l3 {
            for variant in term_variants(l3) {
                if let Some(id) = lookup(store, l1, l2, Some(&variant)).await? {
                    return Ok(Some(id));
                }
            }
        }

        Ok(None)
    }
}

async fn lookup<S>(
    store: &mut S,
    l1: &str,
    l2: Option<&str>,
    l3: Option<&str>,
) -> Result<Option<NodeId>>
where
    S: OrganoStore + ?Sized,
{
    store.find_by_levels(l1, l2, l3).await
}

/// LOCAL node named `l2` whose municipality (`level3_norm`) is `l1`
async fn local_fallback<S>(store: &mut S, l1: &str, l2: &str) -> Result<Option<NodeId>>
where
    S: OrganoStore + ?Sized,
{
    let matches = store.find_by_name(NodeType::Local, l2, Some(l1)).await?;
    Ok(matches.into_iter().next().map(|node| node.id().clone()))
}

fn found(
    id: NodeId,
    strategy: MatchStrategy,
    l1: &str,
    l2: &Option<String>,
    l3: &Option<String>,
) -> Resolution {
    debug!(
        id = %id,
        strategy = %strategy,
        level1 = %l1,
        level2 = l2.as_deref().unwrap_or("-"),
        level3 = l3.as_deref().unwrap_or("-"),
        "Resolved"
    );
    Resolution { id, strategy }
}
