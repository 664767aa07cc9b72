//! Report output for a built graph.
//!
//! This module provides exporters that write a [`BuildGraph`] as JSON (the
//! full node and edge snapshot), CSV (one row per module) or Markdown (a
//! human-readable summary).

pub mod csv;
pub mod json;
pub mod markdown;

use crate::graph::BuildGraph;
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full graph
    Json,
    /// CSV format - spreadsheet-friendly module table
    Csv,
    /// Markdown format - summary report
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, csv, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Write the graph to the given writer.
    fn export<W: Write>(&self, graph: &BuildGraph, writer: &mut W) -> io::Result<()>;
}

/// Export a graph in the specified format.
pub fn export<W: Write>(format: ExportFormat, graph: &BuildGraph, writer: &mut W) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(graph, writer),
        ExportFormat::Csv => csv::CsvExporter.export(graph, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter::default().export(graph, writer),
    }
}

/// Export a graph to a string.
pub fn export_to_string(format: ExportFormat, graph: &BuildGraph) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, graph, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
