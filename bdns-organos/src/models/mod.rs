//! Data models for the administrative hierarchy

pub mod node_id;
pub mod organo;

pub use node_id::{NodeId, NodeType};
pub use organo::{FieldDiff, Levels, Organo};
