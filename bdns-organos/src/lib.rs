//! bdns-organos: administrative-body resolution for BDNS data
//!
//! Matches the free-text administrative unit names found in BDNS feeds to
//! the canonical nodes of the `organo` hierarchy, and populates that
//! hierarchy from the administrative-body listing service without ever
//! overwriting an existing node.
//!
//! Layers, leaf to root:
//! - [`normalize`]: accent/case/whitespace folding used for every comparison
//! - [`models`]: node ids, node types and the [`models::Organo`] record
//! - [`store`]: the [`store::OrganoStore`] seam (SQLite and in-memory)
//! - [`resolver`]: hierarchical lookup with the local-government fallback
//! - [`upsert`]: conflict-aware insertion with `_n` id disambiguation
//! - [`listing`], [`client`], [`import`]: batch population from the listing service

pub mod client;
pub mod error;
pub mod import;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod store;
pub mod terms;
pub mod upsert;

pub use crate::error::{OrganoError, Result};
pub use crate::models::{NodeId, NodeType, Organo};
pub use crate::normalize::normalize;
pub use crate::resolver::{MatchStrategy, Resolution, Resolver};
pub use crate::upsert::{UpsertOutcome, Upserter};
