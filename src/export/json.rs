//! JSON export implementation.
//!
//! Writes the whole graph: every node with its links, every relationship
//! with its reasons, and the derived summary, duplicates and cycles.

use super::Exporter;
use crate::graph::{
    AssetNode, BuildGraph, ChunkNode, DuplicatedModule, GraphSummary, NamedChunkGroupNode,
    Relationship,
};
use crate::stats::DatabaseId;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable module for JSON output.
///
/// Carries the links and flags but not the raw payload, which would
/// repeat every reason already present in `relationships`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonModule<'a> {
    id: DatabaseId,
    identifier: Option<&'a str>,
    name: Option<&'a str>,
    size: u64,
    individual_size: u64,
    is_entry: bool,
    is_super_module: bool,
    is_sub_module: bool,
    path_from_entry: &'a [DatabaseId],
    parent_module_ids: &'a BTreeSet<DatabaseId>,
    child_module_ids: &'a BTreeSet<DatabaseId>,
    parent_chunk_ids: &'a BTreeSet<DatabaseId>,
    named_chunk_group_ids: &'a BTreeSet<DatabaseId>,
    #[serde(skip_serializing_if = "no_ids")]
    inner_concatenated_module_ids: &'a BTreeSet<DatabaseId>,
    #[serde(skip_serializing_if = "no_ids")]
    parent_chunk_ids_from_super_module: &'a BTreeSet<DatabaseId>,
}

fn no_ids(ids: &&BTreeSet<DatabaseId>) -> bool {
    ids.is_empty()
}

/// Root JSON export structure.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    summary: GraphSummary,
    modules: Vec<JsonModule<'a>>,
    chunks: Vec<&'a ChunkNode>,
    named_chunk_groups: Vec<&'a NamedChunkGroupNode>,
    assets: Vec<&'a AssetNode>,
    relationships: Vec<&'a Relationship>,
    reason_types: &'a BTreeSet<String>,
    duplicated_modules: Vec<DuplicatedModule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cycles: Vec<Vec<DatabaseId>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, graph: &BuildGraph, writer: &mut W) -> io::Result<()> {
        let modules = graph
            .modules()
            .map(|m| JsonModule {
                id: m.id,
                identifier: m.raw.identifier.as_deref(),
                name: m.raw.name.as_deref(),
                size: m.raw_size(),
                individual_size: graph.individual_size(m.id).unwrap_or(m.raw.size),
                is_entry: m.is_entry,
                is_super_module: m.is_super_module,
                is_sub_module: m.is_sub_module,
                path_from_entry: &m.path_from_entry,
                parent_module_ids: &m.parent_module_ids,
                child_module_ids: &m.child_module_ids,
                parent_chunk_ids: &m.parent_chunk_ids,
                named_chunk_group_ids: &m.named_chunk_group_ids,
                inner_concatenated_module_ids: &m.inner_concatenated_module_ids,
                parent_chunk_ids_from_super_module: &m.parent_chunk_ids_from_super_module,
            })
            .collect();

        let export = JsonExport {
            summary: graph.summary(),
            modules,
            chunks: graph.chunks().collect(),
            named_chunk_groups: graph.named_chunk_groups().collect(),
            assets: graph.assets().collect(),
            relationships: graph.relationships().collect(),
            reason_types: graph.reason_types(),
            duplicated_modules: graph.duplicated_modules(),
            cycles: graph.module_cycles(),
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
