//! Listing tree → ordered node plan
//!
//! Nodes come out root-to-leaf. Parents are references rather than ids
//! because a parent may itself be disambiguated on insert; the importer
//! substitutes the id each parent actually received.

use crate::listing::provinces::community_of;
use crate::listing::{AdminKind, ListingEntry};
use crate::error::Result;
use crate::models::{Levels, NodeId, NodeType};
use tracing::{debug, warn};

/// Level1 of every central-administration node
pub const CENTRAL_LEVEL1: &str = "ESTADO";
/// Level1 of every "other administrations" node
pub const OTHER_LEVEL1: &str = "OTROS";

/// Where a planned node hangs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// The geographic root
    Root,
    /// An earlier node of the same plan, by index
    Planned(usize),
    /// The autonomous community with this name, created by the regional
    /// import
    Community(String),
}

/// A node waiting to be upserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNode {
    /// Id assigned by the listing service
    pub listing_id: i64,
    pub parent: ParentRef,
    pub name: String,
    pub node_type: NodeType,
    pub levels: Levels,
}

impl PlannedNode {
    /// Node id this entry is stored under before any disambiguation
    pub fn id(&self) -> Result<NodeId> {
        NodeId::compose(self.node_type, self.listing_id)
    }
}

/// Flatten one administration kind's listing, parents before children
pub fn flatten(kind: AdminKind, entries: &[ListingEntry]) -> Vec<PlannedNode> {
    let mut plan = Vec::new();
    for entry in entries {
        match kind {
            AdminKind::Central => two_tier(&mut plan, entry, NodeType::Central, CENTRAL_LEVEL1),
            AdminKind::Other => two_tier(&mut plan, entry, NodeType::Other, OTHER_LEVEL1),
            AdminKind::Regional => regional(&mut plan, entry),
            AdminKind::Local => local(&mut plan, entry),
        }
    }
    debug!(kind = %kind, nodes = plan.len(), "Flattened listing");
    plan
}

fn push(plan: &mut Vec<PlannedNode>, node: PlannedNode) -> usize {
    plan.push(node);
    plan.len() - 1
}

/// Head body under the root, its children under it
fn two_tier(plan: &mut Vec<PlannedNode>, head: &ListingEntry, node_type: NodeType, level1: &str) {
    let head_idx = push(
        plan,
        PlannedNode {
            listing_id: head.id,
            parent: ParentRef::Root,
            name: head.descripcion.clone(),
            node_type,
            levels: Levels::path(&[level1, &head.descripcion]),
        },
    );

    for child in &head.children {
        push(
            plan,
            PlannedNode {
                listing_id: child.id,
                parent: ParentRef::Planned(head_idx),
                name: child.descripcion.clone(),
                node_type,
                levels: Levels::path(&[level1, &head.descripcion, &child.descripcion]),
            },
        );
        skip_deeper(child);
    }
}

fn regional(plan: &mut Vec<PlannedNode>, community: &ListingEntry) {
    let community_idx = push(
        plan,
        PlannedNode {
            listing_id: community.id,
            parent: ParentRef::Root,
            name: community.descripcion.clone(),
            node_type: NodeType::Geographic,
            levels: Levels::path(&[&community.descripcion]),
        },
    );

    for body in &community.children {
        push(
            plan,
            PlannedNode {
                listing_id: body.id,
                parent: ParentRef::Planned(community_idx),
                name: body.descripcion.clone(),
                node_type: NodeType::Regional,
                levels: Levels::path(&[&community.descripcion, &body.descripcion]),
            },
        );
        skip_deeper(body);
    }
}

fn local(plan: &mut Vec<PlannedNode>, province: &ListingEntry) {
    let community = community_of(&province.descripcion);
    let (parent, level1) = match community {
        Some(name) => (ParentRef::Community(name.to_string()), Some(name)),
        None => {
            warn!(
                province = %province.descripcion,
                "Province has no known community, placing it under the root"
            );
            (ParentRef::Root, None)
        }
    };

    let path = |rest: &[&str]| -> Levels {
        let mut parts: Vec<&str> = level1.into_iter().collect();
        parts.extend_from_slice(rest);
        match level1 {
            Some(_) => Levels::path(&parts),
            // Keep the province in level2 so every local path has the same shape.
            // Without level1 these nodes cannot be resolved by level text.
            None => Levels::new(None, Some(rest[0].to_string()), rest.get(1).map(|s| s.to_string())),
        }
    };

    let province_idx = push(
        plan,
        PlannedNode {
            listing_id: province.id,
            parent,
            name: province.descripcion.clone(),
            node_type: NodeType::Geographic,
            levels: path(&[&province.descripcion]),
        },
    );

    for municipality in &province.children {
        let levels = path(&[&province.descripcion, &municipality.descripcion]);
        let municipality_idx = push(
            plan,
            PlannedNode {
                listing_id: municipality.id,
                parent: ParentRef::Planned(province_idx),
                name: municipality.descripcion.clone(),
                node_type: NodeType::Geographic,
                levels: levels.clone(),
            },
        );

        for body in &municipality.children {
            push(
                plan,
                PlannedNode {
                    listing_id: body.id,
                    parent: ParentRef::Planned(municipality_idx),
                    name: body.descripcion.clone(),
                    node_type: NodeType::Local,
                    levels: levels.clone(),
                },
            );
            skip_deeper(body);
        }
    }
}

fn skip_deeper(entry: &ListingEntry) {
    if !entry.children.is_empty() {
        debug!(
            id = entry.id,
            skipped = entry.subtree_len() - 1,
            "Ignoring entries below the third listing level"
        );
    }
}
