//! Node identifiers and node types
//!
//! Ids are `{prefix}{number}` (`G0`, `C3`, `A12`, `L45`) where the prefix
//! comes from the node type, optionally followed by `_{n}` disambiguation
//! suffixes added by the upserter (`C3_1`, `C3_1_2`).

use crate::error::{OrganoError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Kind of administrative node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Territory: the state root, autonomous communities, provinces, municipalities
    Geographic,
    /// Body of an autonomous-community government
    Regional,
    /// Body of a local government (town hall, provincial council, ...)
    Local,
    /// Body of the central state administration
    Central,
    /// Anything the listing service files under "other administrations"
    Other,
}

impl NodeType {
    pub const ALL: [NodeType; 5] = [
        NodeType::Geographic,
        NodeType::Regional,
        NodeType::Local,
        NodeType::Central,
        NodeType::Other,
    ];

    /// Id prefix for nodes of this type
    pub fn prefix(self) -> char {
        match self {
            NodeType::Geographic => 'G',
            NodeType::Regional => 'A',
            NodeType::Local => 'L',
            NodeType::Central => 'C',
            NodeType::Other => 'O',
        }
    }

    /// Storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Geographic => "GEOGRAPHIC",
            NodeType::Regional => "REGIONAL",
            NodeType::Local => "LOCAL",
            NodeType::Central => "CENTRAL",
            NodeType::Other => "OTHER",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = OrganoError;

    fn from_str(s: &str) -> Result<Self> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| OrganoError::InvalidNode(format!("unknown node type '{}'", s)))
    }
}

/// Stable node identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Parse and validate an id
    ///
    /// Accepts ASCII letters, digits and `_`; must start with a letter.
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = raw.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !raw.ends_with('_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(OrganoError::InvalidNode(format!("malformed node id '{}'", raw)))
        }
    }

    /// Build `{prefix}{number}` for a node type and a listing-service id
    ///
    /// Negative numbers are rejected: `C-3` would not survive [`NodeId::parse`].
    pub fn compose(node_type: NodeType, number: i64) -> Result<Self> {
        if number < 0 {
            return Err(OrganoError::InvalidNode(format!(
                "negative listing id {} for {} node",
                number, node_type
            )));
        }
        Ok(Self(format!("{}{}", node_type.prefix(), number)))
    }

    /// The `n`-th disambiguated variant of this id: `{id}_{n}`
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}_{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NodeId {
    type Err = OrganoError;

    fn from_str(s: &str) -> Result<Self> {
        NodeId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_uses_type_prefix() {
        assert_eq!(NodeId::compose(NodeType::Geographic, 0).unwrap().as_str(), "G0");
        assert_eq!(NodeId::compose(NodeType::Central, 3).unwrap().as_str(), "C3");
        assert_eq!(NodeId::compose(NodeType::Regional, 12).unwrap().as_str(), "A12");
        assert_eq!(NodeId::compose(NodeType::Local, 45).unwrap().as_str(), "L45");
        assert_eq!(NodeId::compose(NodeType::Other, 7).unwrap().as_str(), "O7");
    }

    #[test]
    fn test_compose_rejects_negative_numbers() {
        let err = NodeId::compose(NodeType::Central, -3).unwrap_err();
        assert!(matches!(err, OrganoError::InvalidNode(_)));

        // Every composed id must parse back
        let id = NodeId::compose(NodeType::Local, i64::MAX).unwrap();
        assert_eq!(NodeId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_suffix() {
        let id = NodeId::parse("C3").unwrap();
        assert_eq!(id.with_suffix(1).as_str(), "C3_1");
        assert_eq!(id.with_suffix(1).with_suffix(2).as_str(), "C3_1_2");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "3C", "C 3", "C3_", "Ç3", "C-3"] {
            assert!(NodeId::parse(bad).is_err(), "accepted {:?}", bad);
        }
        for good in ["G0", "C3_1", "T1", "L45_2_1"] {
            assert!(NodeId::parse(good).is_ok(), "rejected {:?}", good);
        }
    }

    #[test]
    fn test_node_type_round_trip() {
        for t in NodeType::ALL {
            assert_eq!(t.as_str().parse::<NodeType>().unwrap(), t);
        }
        assert!("MUNICIPAL".parse::<NodeType>().is_err());
    }
}
