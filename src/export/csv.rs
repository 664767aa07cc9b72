//! CSV export implementation.
//!
//! One row per module, in input order, for spreadsheet use.

use super::Exporter;
use crate::graph::BuildGraph;
use std::collections::HashMap;
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, graph: &BuildGraph, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "id,identifier,name,size,individual_size,chunks,depth,entry,super_module,sub_module,extra_size"
        )?;

        let extra_sizes: HashMap<_, _> = graph
            .duplicated_modules()
            .into_iter()
            .map(|d| (d.module_id, d.extra_size))
            .collect();

        for module in graph.modules() {
            // Unreachable modules get an empty depth.
            let depth = match module.path_from_entry.len() {
                0 => String::new(),
                len => (len - 1).to_string(),
            };

            writeln!(
                writer,
                "{},{},{},{},{},{},{},{},{},{},{}",
                module.id,
                Self::escape_field(module.raw.identifier.as_deref().unwrap_or("")),
                Self::escape_field(module.raw.name.as_deref().unwrap_or("")),
                module.raw_size(),
                graph.individual_size(module.id).unwrap_or(module.raw.size),
                module.all_chunk_ids().len(),
                depth,
                module.is_entry,
                module.is_super_module,
                module.is_sub_module,
                extra_sizes.get(&module.id).copied().unwrap_or(0),
            )?;
        }

        Ok(())
    }
}
