//! Graph construction.
//!
//! A build runs four passes over the same node tables, strictly in order:
//!
//! 1. materialize nodes and lookup tables, roll up named chunk groups
//! 2. link modules to chunks, classify reasons into edges, module BFS
//! 3. chunk parent/child/sibling topology, chunk BFS
//! 4. concatenation compensation, then asset aggregation
//!
//! Each pass reads what the earlier ones wrote. The graph under
//! construction never leaves this module until every pass succeeded.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use super::build_graph::{resolve_key, BuildGraph};
use super::error::{GraphError, GraphResult};
use super::key::NativeKey;
use super::node::{
    AssetNode, ChunkNode, ModuleNode, NamedChunkGroupNode, Relationship, RelationshipReason,
};
use super::reason::ReasonTable;
use super::traversal::shortest_paths;
use crate::config::GraphConfig;
use crate::stats::{BuildRows, DatabaseId, NativeChunkId};

/// Builds a [`BuildGraph`] from the row sets of one build.
///
/// # Example
///
/// ```
/// use bundlescope::graph::GraphBuilder;
/// use bundlescope::stats::BuildRows;
///
/// let rows = BuildRows::parse_str(r#"{
///     "modules": [
///         { "databaseId": 1, "rawPayload": { "identifier": "a", "chunks": [1], "reasons": [{ "type": "entry" }] } },
///         { "databaseId": 2, "rawPayload": { "identifier": "b", "chunks": [1], "reasons": [{ "type": "cjs require", "moduleIdentifier": "a" }] } }
///     ],
///     "chunks": [{ "databaseId": 1, "rawPayload": { "id": 1, "entry": true } }]
/// }"#).unwrap();
///
/// let graph = GraphBuilder::default().build(&rows).unwrap();
/// assert_eq!(graph.module(2).unwrap().path_from_entry, vec![1, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    reasons: ReasonTable,
}

/// What one module's reasons contribute, gathered before any write.
#[derive(Debug, Default)]
struct ReasonPlan {
    is_entry: bool,
    edges: Vec<(DatabaseId, RelationshipReason)>,
    reason_types: Vec<String>,
    unresolved: usize,
}

fn resolve_chunk(
    table: &HashMap<NativeKey, DatabaseId>,
    id: &NativeChunkId,
) -> Option<DatabaseId> {
    resolve_key(table, &NativeKey::chunk(Some(id)))
}

fn resolve_chunks(
    table: &HashMap<NativeKey, DatabaseId>,
    ids: &[NativeChunkId],
) -> (Vec<DatabaseId>, usize) {
    let mut resolved = Vec::with_capacity(ids.len());
    let mut unresolved = 0;
    for id in ids {
        match resolve_chunk(table, id) {
            Some(chunk_id) => resolved.push(chunk_id),
            None => {
                trace!(chunk = %id, "chunk id does not resolve, skipping");
                unresolved += 1;
            }
        }
    }
    (resolved, unresolved)
}

impl GraphBuilder {
    /// Builder using the given reason table.
    pub fn new(reasons: ReasonTable) -> Self {
        Self { reasons }
    }

    /// Builder using the reason table described by a configuration.
    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(config.reason_table())
    }

    /// The reason table used to classify module reasons.
    pub fn reasons(&self) -> &ReasonTable {
        &self.reasons
    }

    /// Run all passes and return the finished graph.
    ///
    /// Fails on an unclassified reason type or on a concatenated module
    /// entry without a module row; no partial graph is returned.
    pub fn build(&self, rows: &BuildRows) -> GraphResult<BuildGraph> {
        let _span = tracing::debug_span!(
            "build_graph",
            modules = rows.modules.len(),
            chunks = rows.chunks.len(),
            named_chunk_groups = rows.named_chunk_groups.len(),
            assets = rows.assets.len()
        )
        .entered();

        let mut graph = materialize(rows);
        self.link_modules(&mut graph)?;
        link_chunks(&mut graph);
        compensate_concatenation(&mut graph)?;
        aggregate_assets(&mut graph);

        debug!(
            relationships = graph.relationships.len(),
            reason_types = graph.reason_types.len(),
            "graph built"
        );
        Ok(graph)
    }

    fn plan_reasons(&self, graph: &BuildGraph, module: &ModuleNode) -> GraphResult<ReasonPlan> {
        let mut plan = ReasonPlan::default();

        for reason in &module.raw.reasons {
            let behavior = self.reasons.classify(&reason.reason_type).ok_or_else(|| {
                GraphError::UnknownReasonType {
                    reason_type: reason.reason_type.clone(),
                    module_id: module.id,
                }
            })?;
            plan.reason_types.push(reason.reason_type.clone());

            if behavior.marks_entry() {
                plan.is_entry = true;
                continue;
            }

            let parent_key = NativeKey::module(reason.module_identifier.as_deref());
            match resolve_key(&graph.modules_by_key, &parent_key) {
                Some(parent_id) => plan.edges.push((
                    parent_id,
                    RelationshipReason {
                        reason_type: reason.reason_type.clone(),
                        is_lazy: behavior.is_lazy(),
                    },
                )),
                None => {
                    trace!(
                        module = module.id,
                        parent = %parent_key,
                        "reason parent does not resolve, skipping"
                    );
                    plan.unresolved += 1;
                }
            }
        }

        Ok(plan)
    }

    /// Pass 2: module -> chunk links, reason edges, entry reachability.
    fn link_modules(&self, graph: &mut BuildGraph) -> GraphResult<()> {
        let module_ids: Vec<DatabaseId> = graph.modules.keys().copied().collect();
        let mut unresolved_chunks = 0;
        let mut unresolved_parents = 0;

        for module_id in module_ids {
            let Some(module) = graph.modules.get(&module_id) else {
                continue;
            };
            let (chunk_ids, skipped) = resolve_chunks(&graph.chunks_by_key, &module.raw.chunks);
            unresolved_chunks += skipped;
            let plan = self.plan_reasons(graph, module)?;

            for chunk_id in chunk_ids {
                let Some(chunk) = graph.chunks.get_mut(&chunk_id) else {
                    continue;
                };
                chunk.child_module_ids.insert(module_id);
                let group_ids = chunk.named_chunk_group_ids.clone();

                if let Some(module) = graph.modules.get_mut(&module_id) {
                    module.parent_chunk_ids.insert(chunk_id);
                    module.named_chunk_group_ids.extend(group_ids);
                }
            }

            unresolved_parents += plan.unresolved;
            graph.reason_types.extend(plan.reason_types);
            if plan.is_entry {
                if let Some(module) = graph.modules.get_mut(&module_id) {
                    module.is_entry = true;
                }
            }

            for (parent_id, reason) in plan.edges {
                graph
                    .relationships
                    .entry((parent_id, module_id))
                    .or_insert_with(|| Relationship::new(parent_id, module_id))
                    .reasons
                    .push(reason);

                if let Some(parent) = graph.modules.get_mut(&parent_id) {
                    parent.child_module_ids.insert(module_id);
                }
                if let Some(child) = graph.modules.get_mut(&module_id) {
                    child.parent_module_ids.insert(parent_id);
                }
            }
        }

        let seeds: Vec<DatabaseId> = graph
            .modules
            .values()
            .filter(|module| module.is_entry)
            .map(|module| module.id)
            .collect();
        let modules = &graph.modules;
        let paths = shortest_paths(&seeds, move |id| {
            modules
                .get(&id)
                .into_iter()
                .flat_map(|module| module.child_module_ids.iter().copied())
        });

        let reachable = paths.len();
        for (id, path) in paths {
            if let Some(module) = graph.modules.get_mut(&id) {
                module.path_from_entry = path;
            }
        }

        debug!(
            entries = seeds.len(),
            reachable,
            edges = graph.relationships.len(),
            unresolved_chunks,
            unresolved_parents,
            "modules linked"
        );
        Ok(())
    }
}

/// Pass 1: nodes, lookup tables and named chunk group totals.
fn materialize(rows: &BuildRows) -> BuildGraph {
    let mut graph = BuildGraph::default();

    for row in &rows.modules {
        if graph.modules.contains_key(&row.database_id) {
            warn!(id = row.database_id, "duplicate module row, keeping the first");
            continue;
        }
        let node = ModuleNode::new(row);
        if !node.key.is_sentinel() {
            if let Some(previous) = graph.modules_by_key.insert(node.key.clone(), node.id) {
                warn!(key = %node.key, previous, current = node.id, "module key reused, later lookups resolve to the current row");
            }
        }
        graph.modules.insert(node.id, node);
    }

    for row in &rows.chunks {
        if graph.chunks.contains_key(&row.database_id) {
            warn!(id = row.database_id, "duplicate chunk row, keeping the first");
            continue;
        }
        let node = ChunkNode::new(row);
        if !node.key.is_sentinel() {
            if let Some(previous) = graph.chunks_by_key.insert(node.key.clone(), node.id) {
                warn!(key = %node.key, previous, current = node.id, "chunk key reused, later lookups resolve to the current row");
            }
        }
        graph.chunks.insert(node.id, node);
    }

    let mut unresolved_group_chunks = 0;
    for row in &rows.named_chunk_groups {
        if graph.named_chunk_groups.contains_key(&row.database_id) {
            warn!(id = row.database_id, "duplicate named chunk group row, keeping the first");
            continue;
        }
        let mut group = NamedChunkGroupNode::new(row);
        let (chunk_ids, skipped) = resolve_chunks(&graph.chunks_by_key, &row.raw_payload.chunks);
        unresolved_group_chunks += skipped;

        for chunk_id in chunk_ids {
            if !group.chunk_ids.insert(chunk_id) {
                continue;
            }
            if let Some(chunk) = graph.chunks.get_mut(&chunk_id) {
                group.total_size += chunk.raw.size;
                chunk.named_chunk_group_ids.insert(group.id);
            }
        }
        graph.named_chunk_groups.insert(group.id, group);
    }

    for row in &rows.assets {
        if graph.assets.contains_key(&row.database_id) {
            warn!(id = row.database_id, "duplicate asset row, keeping the first");
            continue;
        }
        graph.assets.insert(row.database_id, AssetNode::new(row));
    }

    debug!(
        modules = graph.modules.len(),
        chunks = graph.chunks.len(),
        named_chunk_groups = graph.named_chunk_groups.len(),
        assets = graph.assets.len(),
        unresolved_group_chunks,
        "nodes materialized"
    );
    graph
}

/// Pass 3: chunk parents, children and siblings, entry reachability.
fn link_chunks(graph: &mut BuildGraph) {
    let chunk_ids: Vec<DatabaseId> = graph.chunks.keys().copied().collect();
    let mut unresolved = 0;

    for chunk_id in chunk_ids {
        let Some(chunk) = graph.chunks.get(&chunk_id) else {
            continue;
        };
        let (parents, skipped_parents) = resolve_chunks(&graph.chunks_by_key, &chunk.raw.parents);
        let (children, skipped_children) =
            resolve_chunks(&graph.chunks_by_key, &chunk.raw.children);
        let (siblings, skipped_siblings) =
            resolve_chunks(&graph.chunks_by_key, &chunk.raw.siblings);
        unresolved += skipped_parents + skipped_children + skipped_siblings;

        for parent_id in parents {
            link_parent_child(graph, parent_id, chunk_id);
        }
        for child_id in children {
            link_parent_child(graph, chunk_id, child_id);
        }
        // Siblings are made mutual even when only one side lists the other.
        for sibling_id in siblings {
            if let Some(chunk) = graph.chunks.get_mut(&chunk_id) {
                chunk.sibling_chunk_ids.insert(sibling_id);
            }
            if let Some(sibling) = graph.chunks.get_mut(&sibling_id) {
                sibling.sibling_chunk_ids.insert(chunk_id);
            }
        }
    }

    let seeds: Vec<DatabaseId> = graph
        .chunks
        .values()
        .filter(|chunk| chunk.is_entry())
        .map(|chunk| chunk.id)
        .collect();
    let chunks = &graph.chunks;
    let paths = shortest_paths(&seeds, move |id| {
        chunks
            .get(&id)
            .into_iter()
            .flat_map(|chunk| chunk.child_chunk_ids.iter().copied())
    });

    let reachable = paths.len();
    for (id, path) in paths {
        if let Some(chunk) = graph.chunks.get_mut(&id) {
            chunk.path_from_entry = path;
        }
    }

    debug!(entries = seeds.len(), reachable, unresolved, "chunks linked");
}

fn link_parent_child(graph: &mut BuildGraph, parent_id: DatabaseId, child_id: DatabaseId) {
    if let Some(parent) = graph.chunks.get_mut(&parent_id) {
        parent.child_chunk_ids.insert(child_id);
    }
    if let Some(child) = graph.chunks.get_mut(&child_id) {
        child.parent_chunk_ids.insert(parent_id);
    }
}

/// Pass 4a: attribute sub-modules of concatenated modules to the
/// super-module's chunks.
fn compensate_concatenation(graph: &mut BuildGraph) -> GraphResult<()> {
    let module_ids: Vec<DatabaseId> = graph.modules.keys().copied().collect();
    let mut super_modules = 0;

    for super_id in module_ids {
        let Some(module) = graph.modules.get(&super_id) else {
            continue;
        };
        if module.raw.modules.is_empty() {
            continue;
        }

        let mut sub_ids: Vec<DatabaseId> = Vec::with_capacity(module.raw.modules.len());
        for inner in &module.raw.modules {
            let key = NativeKey::module(inner.identifier.as_deref());
            if key == module.key {
                continue;
            }
            let sub_id = resolve_key(&graph.modules_by_key, &key).ok_or_else(|| {
                GraphError::MissingConcatenatedModule {
                    identifier: key.to_string(),
                    super_module_id: super_id,
                }
            })?;
            sub_ids.push(sub_id);
        }
        if sub_ids.is_empty() {
            continue;
        }
        let chunk_ids: BTreeSet<DatabaseId> = module.parent_chunk_ids.clone();

        if let Some(module) = graph.modules.get_mut(&super_id) {
            module.is_super_module = true;
            module.inner_concatenated_module_ids.extend(sub_ids.iter().copied());
        }
        for &sub_id in &sub_ids {
            if let Some(sub) = graph.modules.get_mut(&sub_id) {
                sub.is_sub_module = true;
                sub.super_module_ids.insert(super_id);
                sub.parent_chunk_ids_from_super_module
                    .extend(chunk_ids.iter().copied());
            }
            for chunk_id in &chunk_ids {
                if let Some(chunk) = graph.chunks.get_mut(chunk_id) {
                    chunk.child_submodule_ids.insert(sub_id);
                }
            }
        }
        super_modules += 1;
    }

    debug!(super_modules, "concatenated modules attributed");
    Ok(())
}

/// Pass 4b: per-asset chunk, module, sub-module and group membership.
fn aggregate_assets(graph: &mut BuildGraph) {
    let chunks = &graph.chunks;
    let chunks_by_key = &graph.chunks_by_key;
    let mut unresolved = 0;

    for asset in graph.assets.values_mut() {
        let (chunk_ids, skipped) = resolve_chunks(chunks_by_key, &asset.raw.chunks);
        unresolved += skipped;

        for chunk_id in chunk_ids {
            let Some(chunk) = chunks.get(&chunk_id) else {
                continue;
            };
            asset.chunk_ids.insert(chunk.id);
            asset.module_ids.extend(chunk.child_module_ids.iter().copied());
            asset
                .sub_module_ids
                .extend(chunk.child_submodule_ids.iter().copied());
            asset
                .named_chunk_group_ids
                .extend(chunk.named_chunk_group_ids.iter().copied());
        }
    }

    debug!(assets = graph.assets.len(), unresolved, "assets aggregated");
}
