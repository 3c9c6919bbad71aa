//! The administrative node record
//!
//! Normalized fields are private and computed from their raw counterparts
//! at construction, so the two can never drift apart.

use crate::error::{OrganoError, Result};
use crate::models::{NodeId, NodeType};
use crate::normalize::normalize_str;
use serde::Serialize;
use std::fmt;

/// Raw three-tier path (region / department / office)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Levels {
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
}

impl Levels {
    pub fn new(level1: Option<String>, level2: Option<String>, level3: Option<String>) -> Self {
        Self {
            level1: clean(level1),
            level2: clean(level2),
            level3: clean(level3),
        }
    }

    /// Levels from a leading path of up to three segments
    pub fn path(parts: &[&str]) -> Self {
        let part = |i: usize| parts.get(i).map(|s| s.to_string());
        Self::new(part(0), part(1), part(2))
    }

    fn normalized(&self) -> [Option<String>; 3] {
        [
            self.level1.as_deref().and_then(normalize_str),
            self.level2.as_deref().and_then(normalize_str),
            self.level3.as_deref().and_then(normalize_str),
        ]
    }
}

/// Values that normalize to nothing are stored as absent, keeping raw and
/// normalized columns consistent.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| normalize_str(v).is_some())
}

/// A node in the administrative hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organo {
    id: NodeId,
    parent_id: Option<NodeId>,
    name: String,
    node_type: NodeType,
    #[serde(flatten)]
    levels: Levels,
    name_norm: String,
    level1_norm: Option<String>,
    level2_norm: Option<String>,
    level3_norm: Option<String>,
}

/// One field that differs between a stored node and a proposed one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: &'static str,
    pub existing: Option<String>,
    pub proposed: Option<String>,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:?} -> {:?}",
            self.field,
            self.existing.as_deref().unwrap_or("<none>"),
            self.proposed.as_deref().unwrap_or("<none>")
        )
    }
}

impl Organo {
    /// Build a validated node
    ///
    /// The display name keeps its original casing and accents; it must not
    /// be blank. A node cannot be its own parent.
    pub fn new(
        id: NodeId,
        parent_id: Option<NodeId>,
        name: impl Into<String>,
        node_type: NodeType,
        levels: Levels,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        let name_norm = normalize_str(&name)
            .ok_or_else(|| OrganoError::InvalidNode(format!("node {} has a blank name", id)))?;

        if parent_id.as_ref() == Some(&id) {
            return Err(OrganoError::InvariantViolation {
                id: id.to_string(),
                reason: "node cannot be its own parent".to_string(),
            });
        }

        let levels = Levels::new(levels.level1, levels.level2, levels.level3);
        let [level1_norm, level2_norm, level3_norm] = levels.normalized();

        Ok(Self {
            id,
            parent_id,
            name,
            node_type,
            levels,
            name_norm,
            level1_norm,
            level2_norm,
            level3_norm,
        })
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    pub fn name_norm(&self) -> &str {
        &self.name_norm
    }

    pub fn level1_norm(&self) -> Option<&str> {
        self.level1_norm.as_deref()
    }

    pub fn level2_norm(&self) -> Option<&str> {
        self.level2_norm.as_deref()
    }

    pub fn level3_norm(&self) -> Option<&str> {
        self.level3_norm.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Re-key the node (upserter disambiguation only)
    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    /// Fields whose values differ, ignoring the id
    ///
    /// Normalized fields are derived, so comparing raw values covers them.
    pub fn diff(&self, other: &Organo) -> Vec<FieldDiff> {
        let mut diffs = Vec::new();
        let mut check = |field: &'static str, a: Option<&str>, b: Option<&str>| {
            if a != b {
                diffs.push(FieldDiff {
                    field,
                    existing: a.map(str::to_string),
                    proposed: b.map(str::to_string),
                });
            }
        };

        check(
            "parent_id",
            self.parent_id.as_ref().map(NodeId::as_str),
            other.parent_id.as_ref().map(NodeId::as_str),
        );
        check("name", Some(self.name.as_str()), Some(other.name.as_str()));
        check(
            "node_type",
            Some(self.node_type.as_str()),
            Some(other.node_type.as_str()),
        );
        check(
            "level1",
            self.levels.level1.as_deref(),
            other.levels.level1.as_deref(),
        );
        check(
            "level2",
            self.levels.level2.as_deref(),
            other.levels.level2.as_deref(),
        );
        check(
            "level3",
            self.levels.level3.as_deref(),
            other.levels.level3.as_deref(),
        );

        diffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> NodeId {
        NodeId::parse(raw).unwrap()
    }

    #[test]
    fn test_normalized_levels_follow_raw() {
        let node = Organo::new(
            id("L45"),
            Some(id("G900")),
            "Ayuntamiento de Vigo",
            NodeType::Local,
            Levels::path(&["Galicia", "Pontevedra", "  Vigo "]),
        )
        .unwrap();

        assert_eq!(node.name(), "Ayuntamiento de Vigo");
        assert_eq!(node.name_norm(), "AYUNTAMIENTO DE VIGO");
        assert_eq!(node.level1_norm(), Some("GALICIA"));
        assert_eq!(node.level3_norm(), Some("VIGO"));
        assert_eq!(node.levels().level3.as_deref(), Some("Vigo"));
    }

    #[test]
    fn test_blank_levels_become_absent() {
        let levels = Levels::new(Some("ESTADO".into()), Some("   ".into()), Some(String::new()));
        assert_eq!(levels.level2, None);
        assert_eq!(levels.level3, None);
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = Organo::new(id("C1"), None, "  ", NodeType::Central, Levels::default());
        assert!(matches!(result, Err(OrganoError::InvalidNode(_))));
    }

    #[test]
    fn test_self_parent_rejected() {
        let result = Organo::new(
            id("C1"),
            Some(id("C1")),
            "MINISTERIO",
            NodeType::Central,
            Levels::default(),
        );
        assert!(matches!(result, Err(OrganoError::InvariantViolation { .. })));
    }

    #[test]
    fn test_diff_lists_changed_fields_only() {
        let a = Organo::new(
            id("C3"),
            Some(id("G0")),
            "MINISTERIO X",
            NodeType::Central,
            Levels::path(&["ESTADO", "MINISTERIO X"]),
        )
        .unwrap();
        let mut b = Organo::new(
            id("C3"),
            Some(id("G0")),
            "MINISTERIO Y",
            NodeType::Central,
            Levels::path(&["ESTADO", "MINISTERIO Y"]),
        )
        .unwrap();

        let diffs = a.diff(&b);
        let fields: Vec<_> = diffs.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["name", "level2"]);
        assert_eq!(
            diffs[0].to_string(),
            "name: \"MINISTERIO X\" -> \"MINISTERIO Y\""
        );

        b.set_id(id("C3_1"));
        assert!(!a.diff(&b).is_empty());
        assert!(a.diff(&a.clone()).is_empty());
    }
}
