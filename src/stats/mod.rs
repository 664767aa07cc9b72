//! Build report input.
//!
//! This module holds the raw per-entity payloads a bundler reports
//! (modules, chunks, named chunk groups and assets) and the row sets that
//! carry them into the graph engine.
//!
//! # Example
//!
//! ```ignore
//! use bundlescope::stats::{BuildRows, StatsReport};
//!
//! // Rows exported from storage
//! let rows = BuildRows::from_file("rows.json")?;
//!
//! // Or numbered straight from a stats.json report
//! let stats = StatsReport::from_file("stats.json")?;
//! let rows = BuildRows::from_stats(&stats, 1);
//! ```

pub mod payload;
pub mod rows;

pub use payload::{
    format_size, NativeChunkId, RawAsset, RawChunk, RawConcatenatedModule, RawModule,
    RawNamedChunkGroup, RawReason, StatsChunkGroup, StatsReport,
};
pub use rows::{BuildRows, DatabaseId, LoadError, Row};
