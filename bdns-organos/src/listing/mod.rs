//! Administrative-body listing service model
//!
//! The service returns one nested tree per administration kind:
//! - central: ministry → body
//! - regional: autonomous community → body
//! - local: province → municipality → local body
//! - other: entity → body
//!
//! Every entry carries a numeric `id`, a `descripcion` and optional
//! `children`. [`flatten`] turns a tree into upsert-ready nodes.

pub mod flatten;
pub mod provinces;

pub use flatten::{flatten, ParentRef, PlannedNode};

use crate::error::{OrganoError, Result};
use crate::models::NodeType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of the listing tree
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListingEntry {
    pub id: i64,
    pub descripcion: String,
    #[serde(default)]
    pub children: Vec<ListingEntry>,
}

impl ListingEntry {
    /// Number of entries in this subtree, itself included
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(ListingEntry::subtree_len).sum::<usize>()
    }
}

/// Administration kind, as requested from the service (`idAdmon`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminKind {
    Central,
    Regional,
    Local,
    Other,
}

impl AdminKind {
    /// Import order: parents of local provinces (communities) come from
    /// the regional listing
    pub const ALL: [AdminKind; 4] = [
        AdminKind::Central,
        AdminKind::Regional,
        AdminKind::Local,
        AdminKind::Other,
    ];

    /// `idAdmon` query value
    pub fn code(self) -> char {
        match self {
            AdminKind::Central => 'C',
            AdminKind::Regional => 'A',
            AdminKind::Local => 'L',
            AdminKind::Other => 'O',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdminKind::Central => "central",
            AdminKind::Regional => "regional",
            AdminKind::Local => "local",
            AdminKind::Other => "other",
        }
    }

    /// Type of the bodies (non-geographic nodes) this kind produces
    pub fn body_type(self) -> NodeType {
        match self {
            AdminKind::Central => NodeType::Central,
            AdminKind::Regional => NodeType::Regional,
            AdminKind::Local => NodeType::Local,
            AdminKind::Other => NodeType::Other,
        }
    }
}

impl fmt::Display for AdminKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdminKind {
    type Err = OrganoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "central" | "c" => Ok(AdminKind::Central),
            "regional" | "a" => Ok(AdminKind::Regional),
            "local" | "l" => Ok(AdminKind::Local),
            "other" | "o" => Ok(AdminKind::Other),
            other => Err(OrganoError::InvalidNode(format!(
                "unknown administration kind: {}",
                other
            ))),
        }
    }
}

/// Decode a listing payload; a blank body is an empty listing
pub fn parse_listing(body: &str) -> Result<Vec<ListingEntry>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(body)?)
}
