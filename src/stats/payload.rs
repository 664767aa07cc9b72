//! Raw bundler payloads.
//!
//! These mirror the per-entity objects found in a webpack stats.json
//! report. The graph engine trusts them as-is: nothing here is validated
//! beyond what serde needs to deserialize the shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::rows::LoadError;

/// Chunk ID can be either a number or string in webpack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum NativeChunkId {
    /// Numeric chunk ID
    Number(u64),
    /// String chunk ID (named chunk ids)
    String(String),
}

impl std::fmt::Display for NativeChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeChunkId::Number(n) => write!(f, "{}", n),
            NativeChunkId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for NativeChunkId {
    fn from(id: u64) -> Self {
        NativeChunkId::Number(id)
    }
}

impl From<&str> for NativeChunkId {
    fn from(id: &str) -> Self {
        NativeChunkId::String(id.to_string())
    }
}

/// A module as recorded by the bundler.
///
/// A concatenated ("super") module carries the merged pieces in
/// `modules`; its first entry is the module itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawModule {
    /// Bundler module id (numeric or hashed, unused for linking)
    pub id: Option<serde_json::Value>,

    /// Unique module identifier (full request path)
    pub identifier: Option<String>,

    /// Short module name/path
    pub name: Option<String>,

    /// Module size in bytes; combined size for concatenated modules
    #[serde(default)]
    pub size: u64,

    /// Chunk IDs this module belongs to
    #[serde(default)]
    pub chunks: Vec<NativeChunkId>,

    /// Reasons why this module was included
    #[serde(default)]
    pub reasons: Vec<RawReason>,

    /// Merged-in modules (for concatenated modules)
    #[serde(default)]
    pub modules: Vec<RawConcatenatedModule>,

    /// Why the bundler could not concatenate this module
    #[serde(default)]
    pub optimization_bailout: Vec<String>,
}

/// Reason why a module was included in the build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawReason {
    /// Type of reason (e.g., "harmony import specifier")
    #[serde(rename = "type")]
    pub reason_type: String,

    /// Identifier of the module that caused the inclusion
    pub module_identifier: Option<String>,

    /// Name of the module that caused the inclusion
    pub module_name: Option<String>,

    /// User request string
    pub user_request: Option<String>,

    /// Location in the importing module
    pub loc: Option<String>,
}

impl RawReason {
    /// Creates a reason pointing at a parent module identifier.
    pub fn new(reason_type: impl Into<String>, module_identifier: Option<&str>) -> Self {
        Self {
            reason_type: reason_type.into(),
            module_identifier: module_identifier.map(str::to_string),
            module_name: None,
            user_request: None,
            loc: None,
        }
    }
}

/// One merged piece inside a concatenated module.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawConcatenatedModule {
    /// Identifier of the merged module
    pub identifier: Option<String>,

    /// Short name of the merged module
    pub name: Option<String>,

    /// Standalone size of the merged module
    #[serde(default)]
    pub size: u64,
}

/// Represents a webpack chunk (code-split bundle).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawChunk {
    /// Chunk ID (can be number or string)
    pub id: Option<NativeChunkId>,

    /// Chunk names
    #[serde(default)]
    pub names: Vec<String>,

    /// Total size of the chunk in bytes
    #[serde(default)]
    pub size: u64,

    /// Files generated for this chunk
    #[serde(default)]
    pub files: Vec<String>,

    /// Parent chunk IDs
    #[serde(default)]
    pub parents: Vec<NativeChunkId>,

    /// Child chunk IDs
    #[serde(default)]
    pub children: Vec<NativeChunkId>,

    /// Sibling chunk IDs
    #[serde(default)]
    pub siblings: Vec<NativeChunkId>,

    /// Whether this is an entry chunk
    #[serde(default)]
    pub entry: bool,

    /// Whether this is an initial chunk
    #[serde(default)]
    pub initial: bool,
}

/// A named chunk group (entrypoints and named async groups).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawNamedChunkGroup {
    /// Group name
    #[serde(default)]
    pub name: String,

    /// Chunk IDs in this group
    #[serde(default)]
    pub chunks: Vec<NativeChunkId>,
}

/// Represents a generated asset file from webpack build.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    /// Asset file name
    pub name: String,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    /// Chunk IDs this asset belongs to
    #[serde(default)]
    pub chunks: Vec<NativeChunkId>,
}

/// Chunk group entry as it appears in the stats `namedChunkGroups` map.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsChunkGroup {
    /// Group name (webpack 5 repeats the map key here)
    pub name: Option<String>,

    /// Chunk IDs in this group
    #[serde(default)]
    pub chunks: Vec<NativeChunkId>,
}

/// Represents a webpack stats.json file output.
///
/// Only the collections the graph engine consumes are kept.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// Webpack version used for the build
    pub version: Option<String>,

    /// Build hash identifier
    pub hash: Option<String>,

    /// List of generated assets (output files)
    #[serde(default)]
    pub assets: Vec<RawAsset>,

    /// List of chunks (code-split bundles)
    #[serde(default)]
    pub chunks: Vec<RawChunk>,

    /// List of all modules included in the build
    #[serde(default)]
    pub modules: Vec<RawModule>,

    /// Named chunk groups, keyed by name
    #[serde(default)]
    pub named_chunk_groups: BTreeMap<String, StatsChunkGroup>,
}

impl StatsReport {
    /// Parse a stats report from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse a stats report from a JSON string.
    pub fn parse_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Format a byte size as a human-readable string.
///
/// # Example
///
/// ```
/// use bundlescope::stats::format_size;
///
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
