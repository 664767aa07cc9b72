//! The built, read-only relationship graph of one build.

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::key::NativeKey;
use super::node::{AssetNode, ChunkNode, ModuleNode, NamedChunkGroupNode, Relationship};
use crate::stats::{DatabaseId, NativeChunkId};

/// A module that ends up in more than one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatedModule {
    /// Database id of the module
    pub module_id: DatabaseId,
    /// Every chunk carrying the module
    pub chunk_ids: BTreeSet<DatabaseId>,
    /// Standalone size of the module
    pub individual_size: u64,
    /// Bytes spent on the copies beyond the first
    pub extra_size: u64,
}

/// Headline numbers for a built graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    /// Module nodes, including unreachable ones
    pub module_count: usize,
    /// Chunk nodes
    pub chunk_count: usize,
    /// Named chunk groups
    pub named_chunk_group_count: usize,
    /// Emitted assets
    pub asset_count: usize,
    /// Distinct (parent, child) module edges
    pub relationship_count: usize,
    /// Modules marked as entry points
    pub entry_module_count: usize,
    /// Modules with no path from any entry
    pub unreachable_module_count: usize,
    /// Modules that absorbed concatenated modules
    pub super_module_count: usize,
    /// Modules merged into a super-module
    pub sub_module_count: usize,
    /// Sum of asset sizes in bytes
    pub total_asset_size: u64,
    /// Bytes spent on modules repeated across chunks
    pub duplication_cost: u64,
}

/// Cross-referenced modules, chunks, named chunk groups and assets.
///
/// Produced by [`GraphBuilder::build`](super::GraphBuilder::build); there
/// is no way to mutate it afterwards. Nodes are kept in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildGraph {
    pub(super) modules: IndexMap<DatabaseId, ModuleNode>,
    pub(super) chunks: IndexMap<DatabaseId, ChunkNode>,
    pub(super) named_chunk_groups: IndexMap<DatabaseId, NamedChunkGroupNode>,
    pub(super) assets: IndexMap<DatabaseId, AssetNode>,
    pub(super) modules_by_key: HashMap<NativeKey, DatabaseId>,
    pub(super) chunks_by_key: HashMap<NativeKey, DatabaseId>,
    pub(super) relationships: IndexMap<(DatabaseId, DatabaseId), Relationship>,
    pub(super) reason_types: BTreeSet<String>,
}

/// Resolve a key against a lookup table. Sentinel keys never resolve.
pub(super) fn resolve_key(
    table: &HashMap<NativeKey, DatabaseId>,
    key: &NativeKey,
) -> Option<DatabaseId> {
    if key.is_sentinel() {
        return None;
    }
    table.get(key).copied()
}

impl BuildGraph {
    /// All modules in input order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules.values()
    }

    /// Module by database id.
    pub fn module(&self, id: DatabaseId) -> Option<&ModuleNode> {
        self.modules.get(&id)
    }

    /// Module by sanitized identifier key.
    pub fn module_by_key(&self, key: &NativeKey) -> Option<&ModuleNode> {
        resolve_key(&self.modules_by_key, key).and_then(|id| self.modules.get(&id))
    }

    /// Module by native identifier (suffix stripped before lookup).
    pub fn module_by_identifier(&self, identifier: &str) -> Option<&ModuleNode> {
        self.module_by_key(&NativeKey::module(Some(identifier)))
    }

    /// All chunks in input order.
    pub fn chunks(&self) -> impl Iterator<Item = &ChunkNode> {
        self.chunks.values()
    }

    /// Chunk by database id.
    pub fn chunk(&self, id: DatabaseId) -> Option<&ChunkNode> {
        self.chunks.get(&id)
    }

    /// Chunk by sanitized id key.
    pub fn chunk_by_key(&self, key: &NativeKey) -> Option<&ChunkNode> {
        resolve_key(&self.chunks_by_key, key).and_then(|id| self.chunks.get(&id))
    }

    /// Chunk by the bundler's chunk id.
    pub fn chunk_by_native_id(&self, id: &NativeChunkId) -> Option<&ChunkNode> {
        self.chunk_by_key(&NativeKey::chunk(Some(id)))
    }

    /// All named chunk groups in input order.
    pub fn named_chunk_groups(&self) -> impl Iterator<Item = &NamedChunkGroupNode> {
        self.named_chunk_groups.values()
    }

    /// Named chunk group by database id.
    pub fn named_chunk_group(&self, id: DatabaseId) -> Option<&NamedChunkGroupNode> {
        self.named_chunk_groups.get(&id)
    }

    /// First named chunk group with the given name.
    pub fn named_chunk_group_by_name(&self, name: &str) -> Option<&NamedChunkGroupNode> {
        self.named_chunk_groups.values().find(|group| group.name == name)
    }

    /// All assets in input order.
    pub fn assets(&self) -> impl Iterator<Item = &AssetNode> {
        self.assets.values()
    }

    /// Asset by database id.
    pub fn asset(&self, id: DatabaseId) -> Option<&AssetNode> {
        self.assets.get(&id)
    }

    /// First asset with the given file name.
    pub fn asset_by_name(&self, name: &str) -> Option<&AssetNode> {
        self.assets.values().find(|asset| asset.name() == name)
    }

    /// Every module edge, in the order edges were first created.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// The edge from `parent` to `child`, if any.
    pub fn relationship(&self, parent: DatabaseId, child: DatabaseId) -> Option<&Relationship> {
        self.relationships.get(&(parent, child))
    }

    /// Edges into a module, one per parent.
    pub fn parent_relationships(&self, id: DatabaseId) -> Vec<&Relationship> {
        self.modules
            .get(&id)
            .map(|module| {
                module
                    .parent_module_ids
                    .iter()
                    .filter_map(|&parent| self.relationships.get(&(parent, id)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Edges out of a module, one per child.
    pub fn child_relationships(&self, id: DatabaseId) -> Vec<&Relationship> {
        self.modules
            .get(&id)
            .map(|module| {
                module
                    .child_module_ids
                    .iter()
                    .filter_map(|&child| self.relationships.get(&(id, child)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every reason type seen on any module.
    pub fn reason_types(&self) -> &BTreeSet<String> {
        &self.reason_types
    }

    /// Modules marked as entry points.
    pub fn entry_modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules.values().filter(|module| module.is_entry)
    }

    /// Chunks marked as entry chunks.
    pub fn entry_chunks(&self) -> impl Iterator<Item = &ChunkNode> {
        self.chunks.values().filter(|chunk| chunk.is_entry())
    }

    /// Every chunk carrying a module, directly or through concatenation.
    pub fn chunks_containing_module(&self, id: DatabaseId) -> BTreeSet<DatabaseId> {
        self.modules
            .get(&id)
            .map(ModuleNode::all_chunk_ids)
            .unwrap_or_default()
    }

    /// Standalone size of a module.
    ///
    /// A merged module's size is read from the matching entry in its
    /// super-module's `modules` list. A super-module's own piece is read
    /// from its own list; anything else reports its raw size.
    pub fn individual_size(&self, id: DatabaseId) -> Option<u64> {
        let module = self.modules.get(&id)?;

        let owners = module
            .super_module_ids
            .iter()
            .filter_map(|super_id| self.modules.get(super_id));
        let own = module.is_super_module.then_some(module);

        for owner in owners.chain(own) {
            let piece = owner
                .raw
                .modules
                .iter()
                .find(|piece| NativeKey::module(piece.identifier.as_deref()) == module.key);
            if let Some(piece) = piece {
                return Some(piece.size);
            }
        }

        Some(module.raw.size)
    }

    /// Modules carried by more than one chunk, costliest first.
    pub fn duplicated_modules(&self) -> Vec<DuplicatedModule> {
        let mut duplicated: Vec<DuplicatedModule> = self
            .modules
            .values()
            .filter_map(|module| {
                let chunk_ids = module.all_chunk_ids();
                if chunk_ids.len() < 2 {
                    return None;
                }
                let individual_size = self.individual_size(module.id).unwrap_or(module.raw.size);
                let extra_size = individual_size * (chunk_ids.len() as u64 - 1);
                Some(DuplicatedModule {
                    module_id: module.id,
                    chunk_ids,
                    individual_size,
                    extra_size,
                })
            })
            .collect();

        duplicated.sort_by(|a, b| {
            b.extra_size
                .cmp(&a.extra_size)
                .then(a.module_id.cmp(&b.module_id))
        });
        duplicated
    }

    /// Total bytes spent on duplicated module copies.
    pub fn duplication_cost(&self) -> u64 {
        self.duplicated_modules().iter().map(|d| d.extra_size).sum()
    }

    /// Assets that contain a chunk.
    pub fn assets_containing_chunk(&self, id: DatabaseId) -> Vec<&AssetNode> {
        self.assets
            .values()
            .filter(|asset| asset.chunk_ids.contains(&id))
            .collect()
    }

    /// Assets that contain a module, directly or as a sub-module.
    pub fn assets_containing_module(&self, id: DatabaseId) -> Vec<&AssetNode> {
        self.assets
            .values()
            .filter(|asset| asset.module_ids.contains(&id) || asset.sub_module_ids.contains(&id))
            .collect()
    }

    /// Circular module dependencies.
    ///
    /// Each cycle is a strongly connected component of the child-edge
    /// graph with more than one module, or a single module with an edge to
    /// itself. Ids are sorted inside each cycle and cycles are sorted by
    /// their first id.
    pub fn module_cycles(&self) -> Vec<Vec<DatabaseId>> {
        let mut edges: DiGraphMap<DatabaseId, ()> = DiGraphMap::new();
        for &id in self.modules.keys() {
            edges.add_node(id);
        }
        for &(parent, child) in self.relationships.keys() {
            edges.add_edge(parent, child, ());
        }

        let mut cycles: Vec<Vec<DatabaseId>> = tarjan_scc(&edges)
            .into_iter()
            .filter(|scc| scc.len() > 1 || edges.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort_unstable();
                scc
            })
            .collect();

        cycles.sort();
        cycles
    }

    /// Counts and totals for reporting.
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            module_count: self.modules.len(),
            chunk_count: self.chunks.len(),
            named_chunk_group_count: self.named_chunk_groups.len(),
            asset_count: self.assets.len(),
            relationship_count: self.relationships.len(),
            entry_module_count: self.entry_modules().count(),
            unreachable_module_count: self.modules.values().filter(|m| !m.is_reachable()).count(),
            super_module_count: self.modules.values().filter(|m| m.is_super_module).count(),
            sub_module_count: self.modules.values().filter(|m| m.is_sub_module).count(),
            total_asset_size: self.assets.values().map(|a| a.raw.size).sum(),
            duplication_cost: self.duplication_cost(),
        }
    }

    /// Returns true if the graph has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
            && self.chunks.is_empty()
            && self.named_chunk_groups.is_empty()
            && self.assets.is_empty()
    }
}
