//! Sanitized native keys.
//!
//! Every cross reference in a build report goes through the bundler's own
//! ids: modules point at chunks by chunk id, reasons point at parent modules
//! by identifier, and so on. Those ids are turned into a [`NativeKey`]
//! before any lookup so that a missing id and a noisy identifier suffix are
//! handled in exactly one place.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::stats::NativeChunkId;

/// Key used for modules that carry no identifier.
pub const MODULE_SENTINEL: &str = "\u{0}module:no-identifier";

/// Key used for chunks that carry no id.
pub const CHUNK_SENTINEL: &str = "\u{0}chunk:no-id";

/// Trailing `|<token>` the bundler appends to identifiers inside reasons.
///
/// The token is a bare word or hash. A last segment holding a path, as in
/// webpack 5's `json|/app/a.json` typed identifiers, is part of the key.
static IDENTIFIER_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\|[A-Za-z0-9_-]*$").unwrap_or_else(|err| panic!("invalid identifier suffix pattern: {err}"))
});

/// Which lookup table a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    /// Keys derived from module identifiers
    Module,
    /// Keys derived from chunk ids
    Chunk,
}

/// A normalized native id, tagged with the kind of entity it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NativeKey {
    kind: EntityKind,
    key: String,
}

impl NativeKey {
    /// Key for a module identifier.
    ///
    /// # Example
    ///
    /// ```
    /// use bundlescope::graph::NativeKey;
    ///
    /// assert_eq!(NativeKey::module(Some("./a.js|xyz123")), NativeKey::module(Some("./a.js")));
    /// assert!(NativeKey::module(None).is_sentinel());
    /// ```
    pub fn module(identifier: Option<&str>) -> Self {
        let key = match identifier {
            Some(identifier) => strip_identifier_suffix(identifier).to_string(),
            None => MODULE_SENTINEL.to_string(),
        };
        Self {
            kind: EntityKind::Module,
            key,
        }
    }

    /// Key for a chunk id.
    pub fn chunk(id: Option<&NativeChunkId>) -> Self {
        let key = match id {
            Some(id) => id.to_string(),
            None => CHUNK_SENTINEL.to_string(),
        };
        Self {
            kind: EntityKind::Chunk,
            key,
        }
    }

    /// Which table this key belongs to.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The normalized key text.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Returns true for keys built from a missing native id.
    ///
    /// Sentinel keys are never resolved: two entities without an id are not
    /// the same entity.
    pub fn is_sentinel(&self) -> bool {
        match self.kind {
            EntityKind::Module => self.key == MODULE_SENTINEL,
            EntityKind::Chunk => self.key == CHUNK_SENTINEL,
        }
    }
}

impl std::fmt::Display for NativeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_sentinel() {
            write!(f, "<no id>")
        } else {
            write!(f, "{}", self.key)
        }
    }
}

/// Strip a trailing `|<token>` from a module identifier.
///
/// Only a last segment made of letters, digits, `_` or `-` goes; an
/// identifier without such a suffix is returned unchanged.
pub fn strip_identifier_suffix(identifier: &str) -> &str {
    match IDENTIFIER_SUFFIX.find(identifier) {
        Some(found) => &identifier[..found.start()],
        None => identifier,
    }
}
