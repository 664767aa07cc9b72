//! Module reason classification.
//!
//! Every reason a bundler records for a module is classified before it
//! touches the graph. A reason type that is not in the table is a hard
//! error at build time (see [`GraphError::UnknownReasonType`]), so the
//! table has to cover every type the bundler can emit.
//!
//! [`GraphError::UnknownReasonType`]: super::GraphError::UnknownReasonType

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How a reason type affects the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonBehavior {
    /// Marks the module as an entry point, adds no edge
    Entry,
    /// Adds a parent -> child edge that is loaded eagerly
    Static,
    /// Adds a parent -> child edge that is loaded on demand
    Lazy,
}

impl ReasonBehavior {
    /// Returns true if reasons of this kind create a relationship edge.
    pub fn creates_edge(&self) -> bool {
        !self.marks_entry()
    }

    /// Returns true if the edge is a lazy (on demand) load.
    pub fn is_lazy(&self) -> bool {
        matches!(self, ReasonBehavior::Lazy)
    }

    /// Returns true if the reason marks an entry module.
    pub fn marks_entry(&self) -> bool {
        matches!(self, ReasonBehavior::Entry)
    }
}

impl std::fmt::Display for ReasonBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Static => write!(f, "static"),
            Self::Lazy => write!(f, "lazy"),
        }
    }
}

/// Reason types emitted by webpack 4 and 5.
const BUILTIN_REASONS: &[(&str, ReasonBehavior)] = &[
    ("entry", ReasonBehavior::Entry),
    ("single entry", ReasonBehavior::Entry),
    ("multi entry", ReasonBehavior::Entry),
    // ES modules
    ("harmony side effect evaluation", ReasonBehavior::Static),
    ("harmony import specifier", ReasonBehavior::Static),
    ("harmony export imported specifier", ReasonBehavior::Static),
    ("harmony export specifier", ReasonBehavior::Static),
    ("harmony export expression", ReasonBehavior::Static),
    ("harmony export header", ReasonBehavior::Static),
    ("harmony accept", ReasonBehavior::Static),
    ("harmony init", ReasonBehavior::Static),
    ("harmony top level this", ReasonBehavior::Static),
    // CommonJS
    ("cjs require", ReasonBehavior::Static),
    ("cjs full require", ReasonBehavior::Static),
    ("cjs export require", ReasonBehavior::Static),
    ("cjs self exports reference", ReasonBehavior::Static),
    ("cjs exports", ReasonBehavior::Static),
    ("cjs require context", ReasonBehavior::Static),
    ("require.resolve", ReasonBehavior::Static),
    ("require.resolve context", ReasonBehavior::Static),
    ("require.context", ReasonBehavior::Static),
    ("require.include", ReasonBehavior::Static),
    ("require.cache", ReasonBehavior::Static),
    ("require header", ReasonBehavior::Static),
    ("module.hot.accept", ReasonBehavior::Static),
    ("module.hot.decline", ReasonBehavior::Static),
    ("import.meta.webpackHot.accept", ReasonBehavior::Static),
    ("import.meta.webpackHot.decline", ReasonBehavior::Static),
    ("module decorator", ReasonBehavior::Static),
    // AMD
    ("amd require", ReasonBehavior::Static),
    ("amd require context", ReasonBehavior::Static),
    ("amd define", ReasonBehavior::Static),
    ("amd require array", ReasonBehavior::Static),
    // Contexts and assets
    ("context element", ReasonBehavior::Static),
    ("import() context element", ReasonBehavior::Static),
    ("import() context eager", ReasonBehavior::Static),
    ("loader", ReasonBehavior::Static),
    ("new URL()", ReasonBehavior::Static),
    ("new Worker()", ReasonBehavior::Lazy),
    ("url()", ReasonBehavior::Static),
    ("css import", ReasonBehavior::Static),
    ("css url", ReasonBehavior::Static),
    ("delegated source", ReasonBehavior::Static),
    ("dll entry", ReasonBehavior::Static),
    ("provided", ReasonBehavior::Static),
    ("container entry", ReasonBehavior::Static),
    ("remote to external", ReasonBehavior::Static),
    ("consume shared fallback", ReasonBehavior::Static),
    ("provide module for shared", ReasonBehavior::Static),
    // On-demand loads
    ("import()", ReasonBehavior::Lazy),
    ("import() eager", ReasonBehavior::Static),
    ("import() weak", ReasonBehavior::Lazy),
    ("import() context lazy", ReasonBehavior::Lazy),
    ("import() context lazy-once", ReasonBehavior::Lazy),
    ("import() context weak", ReasonBehavior::Lazy),
    ("require.ensure", ReasonBehavior::Lazy),
    ("require.ensure item", ReasonBehavior::Lazy),
    ("lazy import()", ReasonBehavior::Lazy),
];

/// Mapping from reason type to behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasonTable {
    behaviors: HashMap<String, ReasonBehavior>,
}

impl Default for ReasonTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReasonTable {
    /// Table with every built-in reason type.
    pub fn builtin() -> Self {
        let behaviors = BUILTIN_REASONS
            .iter()
            .map(|&(reason_type, behavior)| (reason_type.to_string(), behavior))
            .collect();
        Self { behaviors }
    }

    /// Built-in table extended (or overridden) by configured entries.
    ///
    /// # Example
    ///
    /// ```
    /// use bundlescope::graph::{ReasonBehavior, ReasonTable};
    /// use std::collections::BTreeMap;
    ///
    /// let mut extra = BTreeMap::new();
    /// extra.insert("my plugin import".to_string(), ReasonBehavior::Lazy);
    ///
    /// let table = ReasonTable::with_overrides(&extra);
    /// assert_eq!(table.classify("my plugin import"), Some(ReasonBehavior::Lazy));
    /// assert_eq!(table.classify("cjs require"), Some(ReasonBehavior::Static));
    /// ```
    pub fn with_overrides(overrides: &BTreeMap<String, ReasonBehavior>) -> Self {
        let mut table = Self::builtin();
        for (reason_type, &behavior) in overrides {
            table.behaviors.insert(reason_type.clone(), behavior);
        }
        table
    }

    /// Behavior for a reason type, `None` if the type is unknown.
    pub fn classify(&self, reason_type: &str) -> Option<ReasonBehavior> {
        self.behaviors.get(reason_type).copied()
    }

    /// Returns true if the reason type is known.
    pub fn contains(&self, reason_type: &str) -> bool {
        self.behaviors.contains_key(reason_type)
    }

    /// Number of known reason types.
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Returns true if the table knows no reason types.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}
