//! bundlescope - relationship graph engine for bundler build reports
//!
//! This crate turns the modules, chunks, named chunk groups and assets of
//! one build into a cross-referenced graph: why each module is included,
//! how it is reached from an entry point, which chunks and assets carry it,
//! and what concatenation and duplication cost.

pub mod config;
pub mod export;
pub mod graph;
pub mod logger;
pub mod stats;
