//! Relationship graph of a single build.
//!
//! [`GraphBuilder`] turns the four flat row sets of a build (modules,
//! chunks, named chunk groups, assets) into a [`BuildGraph`]: modules
//! linked to chunks and to each other through their reasons, chunks linked
//! into a parent/child/sibling topology, shortest paths from the entry
//! points, sub-modules of concatenated modules attributed to the right
//! chunks, and per-asset membership.
//!
//! # Example
//!
//! ```ignore
//! use bundlescope::graph::GraphBuilder;
//! use bundlescope::stats::BuildRows;
//!
//! let rows = BuildRows::from_file("rows.json")?;
//! let graph = GraphBuilder::default().build(&rows)?;
//!
//! for duplicated in graph.duplicated_modules() {
//!     println!("#{} costs {} extra bytes", duplicated.module_id, duplicated.extra_size);
//! }
//! ```

mod build_graph;
mod builder;
mod error;
mod key;
mod node;
mod reason;
mod traversal;

#[cfg(test)]
mod tests;

pub use build_graph::{BuildGraph, DuplicatedModule, GraphSummary};
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use key::{strip_identifier_suffix, EntityKind, NativeKey, CHUNK_SENTINEL, MODULE_SENTINEL};
pub use node::{
    AssetNode, ChunkNode, ModuleNode, NamedChunkGroupNode, Relationship, RelationshipReason,
};
pub use reason::{ReasonBehavior, ReasonTable};
pub use traversal::shortest_paths;
