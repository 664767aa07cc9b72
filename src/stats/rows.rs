//! Row sets handed to the graph engine.
//!
//! A row is what the storage layer hands back for one entity: the database
//! id it assigned, the file (build) it belongs to, and the untouched raw
//! payload. The engine always receives all four row sets of one build at
//! once.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::payload::{RawAsset, RawChunk, RawModule, RawNamedChunkGroup, StatsReport};

/// Identifier assigned to a row by the storage layer.
pub type DatabaseId = u64;

/// Errors that can occur while loading rows or a stats report.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored entity: database id, owning file and raw payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Row<T> {
    /// Database id, unique per entity kind within one build
    pub database_id: DatabaseId,

    /// File (build) the row belongs to
    #[serde(default)]
    pub file_id: u64,

    /// The bundler's payload for this entity
    pub raw_payload: T,
}

impl<T> Row<T> {
    /// Creates a row.
    pub fn new(database_id: DatabaseId, file_id: u64, raw_payload: T) -> Self {
        Self {
            database_id,
            file_id,
            raw_payload,
        }
    }
}

/// The complete input of one graph build.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildRows {
    /// Module rows
    #[serde(default)]
    pub modules: Vec<Row<RawModule>>,

    /// Chunk rows
    #[serde(default)]
    pub chunks: Vec<Row<RawChunk>>,

    /// Named chunk group rows
    #[serde(default)]
    pub named_chunk_groups: Vec<Row<RawNamedChunkGroup>>,

    /// Asset rows
    #[serde(default)]
    pub assets: Vec<Row<RawAsset>>,
}

impl BuildRows {
    /// Load a row dump from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse a row dump from a JSON string.
    pub fn parse_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build rows straight from a stats report.
    ///
    /// Database ids are assigned sequentially from 1 for each entity kind,
    /// in report order. Named chunk groups follow the report's map order
    /// (sorted by name).
    pub fn from_stats(stats: &StatsReport, file_id: u64) -> Self {
        fn number<T: Clone>(items: &[T], file_id: u64) -> Vec<Row<T>> {
            items
                .iter()
                .zip(1..)
                .map(|(payload, id)| Row::new(id, file_id, payload.clone()))
                .collect()
        }

        let groups: Vec<RawNamedChunkGroup> = stats
            .named_chunk_groups
            .iter()
            .map(|(name, group)| RawNamedChunkGroup {
                name: group.name.clone().unwrap_or_else(|| name.clone()),
                chunks: group.chunks.clone(),
            })
            .collect();

        Self {
            modules: number(&stats.modules, file_id),
            chunks: number(&stats.chunks, file_id),
            named_chunk_groups: number(&groups, file_id),
            assets: number(&stats.assets, file_id),
        }
    }

    /// Total number of rows across all four sets.
    pub fn len(&self) -> usize {
        self.modules.len() + self.chunks.len() + self.named_chunk_groups.len() + self.assets.len()
    }

    /// Returns true if there are no rows at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
