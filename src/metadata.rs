//! Bundler output metadata and the source-export inspector.
//!
//! These are the two external collaborators the manifest pipeline consumes:
//! the bundler reports what it emitted and how the emitted files import each
//! other; the inspector reports which reserved exports a route's source
//! module defines. The pipeline treats both as already-validated input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ManifestError;

// ---------------------------------------------------------------------------
// Reserved route exports
// ---------------------------------------------------------------------------

/// Export name marking a route with a server action.
pub const ACTION_EXPORT: &str = "action";
/// Export name marking a route with a server loader.
pub const LOADER_EXPORT: &str = "loader";
/// Export name marking a route with legacy catch-boundary handling.
pub const CATCH_BOUNDARY_EXPORT: &str = "CatchBoundary";
/// Export name marking a route with error-boundary handling.
pub const ERROR_BOUNDARY_EXPORT: &str = "ErrorBoundary";

// ---------------------------------------------------------------------------
// Import records
// ---------------------------------------------------------------------------

/// How an emitted file references another emitted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// Statement-level static import — must load before the importer runs.
    ImportStatement,
    /// `import()` expression — fetched on demand, never eagerly listed.
    DynamicImport,
}

/// One dependency edge between emitted output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Path of the imported output file, in the same form as the keys of
    /// [`BuildMetadata::outputs`].
    pub path: String,
    pub kind: ImportKind,
}

// ---------------------------------------------------------------------------
// Output metadata
// ---------------------------------------------------------------------------

/// The bundler's record for one emitted output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMeta {
    /// The module specifier this output was bundled from, present only when
    /// the file is itself a bundle entry point. Files that are merely
    /// imported by an entry point carry `None` and are addressed only as
    /// URLs inside another entry's import list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    /// Dependency edges to other emitted files, in the bundler's own
    /// dependency-resolution order.
    #[serde(default)]
    pub imports: Vec<ImportRecord>,
}

/// The bundler's complete output metadata for one build: a mapping from
/// emitted file path to its entry-point association and dependency edges.
///
/// A `BTreeMap` keyed by path gives the lexicographically sorted iteration
/// the pipeline needs for reproducible version hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub outputs: BTreeMap<String, OutputMeta>,
}

impl BuildMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emitted output file.
    pub fn insert(&mut self, path: impl Into<String>, meta: OutputMeta) {
        self.outputs.insert(path.into(), meta);
    }
}

// ---------------------------------------------------------------------------
// Source-export inspector
// ---------------------------------------------------------------------------

/// Reports the top-level export names a route's source module defines.
///
/// Lookups are independent reads of different source files; the builder
/// awaits each one during assembly and all of them complete before the
/// optimizer phase begins.
#[allow(async_fn_in_trait)]
pub trait RouteModuleInspector {
    /// Return the set of top-level export names defined by the source
    /// module backing `route_id`.
    async fn route_exports(&self, route_id: &str) -> Result<Vec<String>, ManifestError>;
}
