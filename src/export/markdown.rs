//! Markdown export implementation.
//!
//! A build report for pull requests and docs: headline numbers, entry
//! points, chunk groups, assets, the costliest duplicated modules and any
//! module cycles.

use super::Exporter;
use crate::graph::BuildGraph;
use crate::stats::{format_size, DatabaseId};
use std::io::{self, Write};

/// Markdown exporter implementation.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownExporter {
    /// Number of duplicated modules listed
    pub top: usize,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self { top: 10 }
    }
}

fn module_label(graph: &BuildGraph, id: DatabaseId) -> String {
    graph
        .module(id)
        .map(|m| m.display_name())
        .unwrap_or_else(|| format!("#{id}"))
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, graph: &BuildGraph, writer: &mut W) -> io::Result<()> {
        let summary = graph.summary();

        writeln!(writer, "# Build Graph Report")?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Modules | {} |", summary.module_count)?;
        writeln!(writer, "| Entry Modules | {} |", summary.entry_module_count)?;
        writeln!(writer, "| Unreachable Modules | {} |", summary.unreachable_module_count)?;
        writeln!(writer, "| Concatenated Modules | {} |", summary.super_module_count)?;
        writeln!(writer, "| Merged Sub-modules | {} |", summary.sub_module_count)?;
        writeln!(writer, "| Relationships | {} |", summary.relationship_count)?;
        writeln!(writer, "| Chunks | {} |", summary.chunk_count)?;
        writeln!(writer, "| Named Chunk Groups | {} |", summary.named_chunk_group_count)?;
        writeln!(writer, "| Assets | {} |", summary.asset_count)?;
        writeln!(writer, "| Total Asset Size | {} |", format_size(summary.total_asset_size))?;
        writeln!(writer, "| Duplication Cost | {} |", format_size(summary.duplication_cost))?;
        writeln!(writer)?;

        let entries: Vec<_> = graph.entry_modules().collect();
        if !entries.is_empty() {
            writeln!(writer, "## Entry Points ({})", entries.len())?;
            writeln!(writer)?;
            for module in entries {
                writeln!(writer, "- `{}`", module.display_name())?;
            }
            writeln!(writer)?;
        }

        let groups: Vec<_> = graph.named_chunk_groups().collect();
        if !groups.is_empty() {
            writeln!(writer, "## Named Chunk Groups")?;
            writeln!(writer)?;
            writeln!(writer, "| Group | Chunks | Total Size |")?;
            writeln!(writer, "|-------|--------|------------|")?;
            for group in groups {
                writeln!(
                    writer,
                    "| {} | {} | {} |",
                    group.name,
                    group.chunk_ids.len(),
                    format_size(group.total_size)
                )?;
            }
            writeln!(writer)?;
        }

        let assets: Vec<_> = graph.assets().collect();
        if !assets.is_empty() {
            writeln!(writer, "## Assets")?;
            writeln!(writer)?;
            writeln!(writer, "| Asset | Size | Chunks | Modules |")?;
            writeln!(writer, "|-------|------|--------|---------|")?;
            for asset in assets {
                writeln!(
                    writer,
                    "| {} | {} | {} | {} |",
                    asset.name(),
                    format_size(asset.raw.size),
                    asset.chunk_ids.len(),
                    asset.module_ids.len() + asset.sub_module_ids.len()
                )?;
            }
            writeln!(writer)?;
        }

        let duplicated = graph.duplicated_modules();
        if !duplicated.is_empty() {
            writeln!(writer, "## Duplicated Modules")?;
            writeln!(writer)?;
            writeln!(writer, "| Module | Size | Chunks | Extra Size |")?;
            writeln!(writer, "|--------|------|--------|------------|")?;
            for module in duplicated.iter().take(self.top) {
                writeln!(
                    writer,
                    "| {} | {} | {} | {} |",
                    module_label(graph, module.module_id),
                    format_size(module.individual_size),
                    module.chunk_ids.len(),
                    format_size(module.extra_size)
                )?;
            }
            if duplicated.len() > self.top {
                writeln!(writer)?;
                writeln!(writer, "*{} more not shown*", duplicated.len() - self.top)?;
            }
            writeln!(writer)?;
        }

        let cycles = graph.module_cycles();
        if !cycles.is_empty() {
            writeln!(writer, "## Circular Dependencies")?;
            writeln!(writer)?;
            for (i, cycle) in cycles.iter().enumerate() {
                let names: Vec<String> = cycle.iter().map(|&id| module_label(graph, id)).collect();
                writeln!(writer, "{}. `{}`", i + 1, names.join(" -> "))?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by bundlescope*")?;

        Ok(())
    }
}
