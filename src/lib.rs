//! # Route Manifest
//!
//! Builds the versioned, browser-facing asset manifest for a route-based
//! application from the bundler's output metadata.
//!
//! The manifest describes, per route, which browser modules must be fetched
//! before the route can execute. The pipeline has three phases, always in
//! this order:
//!
//! 1. **Assemble** — walk emitted entry points in deterministic order,
//!    associate each with a route or the client entry, and collect raw
//!    import lists ([`create_assets_manifest`]).
//! 2. **Optimize** — prune each route's import list against the transitive
//!    closure of its ancestors' imports, so no URL is fetched twice.
//! 3. **Write** — persist the manifest as a single global-assignment script
//!    under a content-addressed filename ([`write_assets_manifest`]).
//!
//! The crate never patches a prior manifest: each build constructs a wholly
//! new manifest object with a new version.

pub mod builder;
pub mod metadata;
pub mod optimize;
pub mod utils;
pub mod writer;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use metadata::{BuildMetadata, ImportKind, ImportRecord, OutputMeta, RouteModuleInspector};
pub use writer::MANIFEST_GLOBAL;

// ---------------------------------------------------------------------------
// Route tree
// ---------------------------------------------------------------------------

/// A node in the application's page/layout tree, derived from the file
/// system by the route discovery stage.
///
/// Routes reference their parent by id, never by direct reference; the
/// config carries an id-indexed table, so the tree is a forest by
/// construction and is never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Unique identifier, stable across builds.
    pub id: String,
    /// Id of the nearest ancestor route. Root routes have none.
    pub parent_id: Option<String>,
    /// URL path pattern. Pathless layouts and index routes may have none.
    pub path: Option<String>,
    /// Whether this is an index route.
    pub index: Option<bool>,
    /// Whether the path matches case-sensitively.
    pub case_sensitive: Option<bool>,
    /// The originating source file. A single file may back multiple routes
    /// (pathless layout variations).
    pub file: String,
}

// ---------------------------------------------------------------------------
// ManifestConfig
// ---------------------------------------------------------------------------

/// Build configuration consumed by the manifest pipeline.
#[derive(Debug, Clone)]
pub struct ManifestConfig {
    /// Id-indexed route table.
    pub routes: BTreeMap<String, Route>,
    /// Directory the bundler emits browser assets into. Output paths are
    /// resolved to URLs relative to this directory.
    pub assets_build_directory: PathBuf,
    /// Public base path browser URLs are served under. Expected to end with
    /// a slash (e.g. `/build/`).
    pub public_path: String,
    /// Source file of the client entry module.
    pub entry_client_file: String,
}

// ---------------------------------------------------------------------------
// ManifestOptions
// ---------------------------------------------------------------------------

/// Optional inputs for one manifest build.
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// URL of the separately bundled stylesheet, if one was produced.
    pub css_bundle_href: Option<String>,
    /// Hot-reload descriptor for dev builds. Carried opaquely; never part
    /// of the version hash.
    pub hmr: Option<HmrDescriptor>,
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A structured diagnostic emitted during manifest construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

// ---------------------------------------------------------------------------
// Manifest data model
// ---------------------------------------------------------------------------

/// The manifest's record for the root browser entry module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Browser URL of the entry module.
    pub module: String,
    /// URLs that must load before the entry module executes. Statement-level
    /// static imports only; dynamic imports are fetched on demand.
    pub imports: Vec<String>,
}

/// The compiled, browser-facing description of one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    /// Browser URL of the route module bundle.
    pub module: String,
    /// Additional module URLs required before the route module can execute.
    /// Starts as the full static dependency list reported by the bundler;
    /// the optimizer removes URLs already covered by an ancestor. Absent,
    /// never empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,
    #[serde(default)]
    pub has_action: bool,
    #[serde(default)]
    pub has_loader: bool,
    #[serde(default)]
    pub has_catch_boundary: bool,
    #[serde(default)]
    pub has_error_boundary: bool,
}

/// Hot-reload descriptor for dev builds. Opaque to this crate and excluded
/// from version hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmrDescriptor {
    /// Browser URL of the hot-reload runtime module.
    pub runtime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// The complete versioned manifest snapshot for one build.
///
/// Immutable once written; a new build produces a wholly new manifest with
/// a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// 8-character uppercase hex prefix of the content hash over
    /// `{entry, routes, cssBundleHref}`.
    pub version: String,
    pub entry: EntryPoint,
    pub routes: BTreeMap<String, ManifestEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_bundle_href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmr: Option<HmrDescriptor>,
    /// Public URL the manifest itself is hosted at. Stamped by the writer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// ManifestOutput
// ---------------------------------------------------------------------------

/// The sealed output of a successful manifest build.
/// Consumers take this as-is — no post-build mutation.
#[derive(Debug, Clone)]
pub struct ManifestOutput {
    pub manifest: Manifest,
    /// Diagnostics collected during assembly.
    pub diagnostics: Vec<Diagnostic>,
}

// ---------------------------------------------------------------------------
// ManifestError
// ---------------------------------------------------------------------------

/// Errors that abort the manifest build.
///
/// Internal-consistency violations indicate a defect in an upstream build
/// stage, not a transient condition; nothing here is retried.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("route module `{file}` has no matching route in the route table")]
    RouteModuleWithoutRoute { file: String },

    #[error("client entry `{entry}` was not found among the bundler's entry points")]
    MissingClientEntry { entry: String },

    #[error("export inspection failed for route `{route_id}`: {message}")]
    ExportLookup { route_id: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Public API — single construction path
// ---------------------------------------------------------------------------

/// Build the asset manifest for one compile.
///
/// **There is only one construction codepath.** Every build — dev, prod,
/// with or without HMR — runs assemble followed by optimize, in that order:
///
/// 1. Walks `metadata.outputs` in lexicographic path order
/// 2. Populates the entry point and one manifest entry per route, querying
///    `inspector` for each route module's reserved exports
/// 3. Prunes every route's import list against its ancestors' imports
/// 4. Stamps the content-derived version
///
/// Fails with [`ManifestError::MissingClientEntry`] if no output entry point
/// matches `config.entry_client_file`, and with
/// [`ManifestError::RouteModuleWithoutRoute`] if a route-tagged bundle
/// resolves to a file no route is backed by.
pub async fn create_assets_manifest<I>(
    config: &ManifestConfig,
    metadata: &BuildMetadata,
    inspector: &I,
    opts: ManifestOptions,
) -> Result<ManifestOutput, ManifestError>
where
    I: RouteModuleInspector,
{
    builder::assemble(config, metadata, inspector, opts).await
}

/// Persist a finalized manifest to the assets build directory.
///
/// Writes `manifest-<VERSION>.js` containing exactly one statement that
/// assigns the serialized manifest to `window.__routeManifest`, and stamps
/// `manifest.url` with the public URL of that file. Returns the on-disk
/// path of the written manifest.
pub async fn write_assets_manifest(
    manifest: &mut Manifest,
    config: &ManifestConfig,
) -> Result<PathBuf, ManifestError> {
    writer::write_assets_manifest(manifest, config).await
}
