//! Graph nodes and relationship records.
//!
//! Nodes are created once, edge-free, when the rows are materialized and
//! are only filled in by later passes. Every id set is ordered so a built
//! graph serializes the same way for the same input.

use serde::Serialize;
use std::collections::BTreeSet;

use super::key::NativeKey;
use crate::stats::{DatabaseId, RawAsset, RawChunk, RawModule, RawNamedChunkGroup, Row};

/// One cause recorded on a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipReason {
    /// Reason type as reported by the bundler
    pub reason_type: String,
    /// Whether this cause loads the child on demand
    pub is_lazy: bool,
}

/// A parent -> child module edge.
///
/// There is one record per (parent, child) pair; repeated causes are
/// appended to `reasons`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Module that caused the inclusion
    pub parent_id: DatabaseId,
    /// Module that was included
    pub child_id: DatabaseId,
    /// Causes in the order they were found
    pub reasons: Vec<RelationshipReason>,
}

impl Relationship {
    /// Creates an edge with no reasons yet.
    pub fn new(parent_id: DatabaseId, child_id: DatabaseId) -> Self {
        Self {
            parent_id,
            child_id,
            reasons: Vec::new(),
        }
    }

    /// Returns true if every cause of this edge is lazy.
    pub fn is_lazy_only(&self) -> bool {
        !self.reasons.is_empty() && self.reasons.iter().all(|r| r.is_lazy)
    }

    /// Returns true if any cause has the given type.
    pub fn has_reason(&self, reason_type: &str) -> bool {
        self.reasons.iter().any(|r| r.reason_type == reason_type)
    }
}

/// A module in the build graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleNode {
    /// Database id of the row
    pub id: DatabaseId,
    /// Sanitized identifier
    pub key: NativeKey,
    /// The bundler's payload
    pub raw: RawModule,
    /// Marked by an entry reason
    pub is_entry: bool,
    /// Shortest path from an entry module, empty if unreachable
    pub path_from_entry: Vec<DatabaseId>,
    /// Modules with an edge into this one
    pub parent_module_ids: BTreeSet<DatabaseId>,
    /// Modules this one has an edge into
    pub child_module_ids: BTreeSet<DatabaseId>,
    /// Chunks that list this module
    pub parent_chunk_ids: BTreeSet<DatabaseId>,
    /// Named chunk groups of those chunks
    pub named_chunk_group_ids: BTreeSet<DatabaseId>,
    /// Sub-modules merged into this module
    pub inner_concatenated_module_ids: BTreeSet<DatabaseId>,
    /// Super-modules this module was merged into
    pub super_module_ids: BTreeSet<DatabaseId>,
    /// Chunks reached only through a super-module
    pub parent_chunk_ids_from_super_module: BTreeSet<DatabaseId>,
    /// Has at least one merged-in sub-module
    pub is_super_module: bool,
    /// Was merged into a super-module
    pub is_sub_module: bool,
}

impl ModuleNode {
    /// Creates an edge-free node for a module row.
    pub fn new(row: &Row<RawModule>) -> Self {
        Self {
            id: row.database_id,
            key: NativeKey::module(row.raw_payload.identifier.as_deref()),
            raw: row.raw_payload.clone(),
            is_entry: false,
            path_from_entry: Vec::new(),
            parent_module_ids: BTreeSet::new(),
            child_module_ids: BTreeSet::new(),
            parent_chunk_ids: BTreeSet::new(),
            named_chunk_group_ids: BTreeSet::new(),
            inner_concatenated_module_ids: BTreeSet::new(),
            super_module_ids: BTreeSet::new(),
            parent_chunk_ids_from_super_module: BTreeSet::new(),
            is_super_module: false,
            is_sub_module: false,
        }
    }

    /// Display name: short name, then identifier, then the database id.
    pub fn display_name(&self) -> String {
        self.raw
            .name
            .as_ref()
            .or(self.raw.identifier.as_ref())
            .cloned()
            .unwrap_or_else(|| format!("#{}", self.id))
    }

    /// Size as reported; combined size for super-modules.
    pub fn raw_size(&self) -> u64 {
        self.raw.size
    }

    /// Returns true if reachable from an entry module.
    pub fn is_reachable(&self) -> bool {
        !self.path_from_entry.is_empty()
    }

    /// Every chunk the module ends up in, directly or via concatenation.
    pub fn all_chunk_ids(&self) -> BTreeSet<DatabaseId> {
        self.parent_chunk_ids
            .union(&self.parent_chunk_ids_from_super_module)
            .copied()
            .collect()
    }
}

/// A chunk in the build graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkNode {
    /// Database id of the row
    pub id: DatabaseId,
    /// Sanitized chunk id
    pub key: NativeKey,
    /// The bundler's payload
    pub raw: RawChunk,
    /// Chunks that load this one
    pub parent_chunk_ids: BTreeSet<DatabaseId>,
    /// Chunks loaded alongside this one
    pub sibling_chunk_ids: BTreeSet<DatabaseId>,
    /// Chunks this one loads
    pub child_chunk_ids: BTreeSet<DatabaseId>,
    /// Named chunk groups containing this chunk
    pub named_chunk_group_ids: BTreeSet<DatabaseId>,
    /// Modules listed directly in this chunk
    pub child_module_ids: BTreeSet<DatabaseId>,
    /// Modules attributed through a concatenated super-module
    pub child_submodule_ids: BTreeSet<DatabaseId>,
    /// Shortest path from an entry chunk, empty if unreachable
    pub path_from_entry: Vec<DatabaseId>,
}

impl ChunkNode {
    /// Creates an edge-free node for a chunk row.
    pub fn new(row: &Row<RawChunk>) -> Self {
        Self {
            id: row.database_id,
            key: NativeKey::chunk(row.raw_payload.id.as_ref()),
            raw: row.raw_payload.clone(),
            parent_chunk_ids: BTreeSet::new(),
            sibling_chunk_ids: BTreeSet::new(),
            child_chunk_ids: BTreeSet::new(),
            named_chunk_group_ids: BTreeSet::new(),
            child_module_ids: BTreeSet::new(),
            child_submodule_ids: BTreeSet::new(),
            path_from_entry: Vec::new(),
        }
    }

    /// Display name: first chunk name, then the native id.
    pub fn display_name(&self) -> String {
        match self.raw.names.first() {
            Some(name) => name.clone(),
            None => self.key.to_string(),
        }
    }

    /// Size as reported by the bundler.
    pub fn raw_size(&self) -> u64 {
        self.raw.size
    }

    /// Returns true if the bundler marked this as an entry chunk.
    pub fn is_entry(&self) -> bool {
        self.raw.entry
    }
}

/// A named chunk group with its size rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedChunkGroupNode {
    /// Database id of the row
    pub id: DatabaseId,
    /// Group name
    pub name: String,
    /// Chunks of this build listed by the group
    pub chunk_ids: BTreeSet<DatabaseId>,
    /// Sum of the sizes of `chunk_ids`
    pub total_size: u64,
}

impl NamedChunkGroupNode {
    /// Creates a group node with no chunks resolved yet.
    pub fn new(row: &Row<RawNamedChunkGroup>) -> Self {
        Self {
            id: row.database_id,
            name: row.raw_payload.name.clone(),
            chunk_ids: BTreeSet::new(),
            total_size: 0,
        }
    }
}

/// An emitted asset and everything it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetNode {
    /// Database id of the row
    pub id: DatabaseId,
    /// The bundler's payload
    pub raw: RawAsset,
    /// Chunks emitted into this asset
    pub chunk_ids: BTreeSet<DatabaseId>,
    /// Modules of those chunks
    pub module_ids: BTreeSet<DatabaseId>,
    /// Sub-modules of those chunks
    pub sub_module_ids: BTreeSet<DatabaseId>,
    /// Named chunk groups of those chunks
    pub named_chunk_group_ids: BTreeSet<DatabaseId>,
}

impl AssetNode {
    /// Creates an asset node with no chunks resolved yet.
    pub fn new(row: &Row<RawAsset>) -> Self {
        Self {
            id: row.database_id,
            raw: row.raw_payload.clone(),
            chunk_ids: BTreeSet::new(),
            module_ids: BTreeSet::new(),
            sub_module_ids: BTreeSet::new(),
            named_chunk_group_ids: BTreeSet::new(),
        }
    }

    /// Asset file name.
    pub fn name(&self) -> &str {
        &self.raw.name
    }
}
