//! Version derivation and manifest persistence.
//!
//! The version covers the reproducible subset of the manifest — entry
//! point, routes, stylesheet URL. The hot-reload descriptor is excluded:
//! HMR metadata changes on every dev rebuild and must not perturb the
//! cache-busting version.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::{utils, EntryPoint, Manifest, ManifestConfig, ManifestEntry, ManifestError};

/// Global property the manifest script assigns on `window`.
pub const MANIFEST_GLOBAL: &str = "__routeManifest";

/// Width of the hexadecimal version prefix.
const VERSION_WIDTH: usize = 8;

/// The deterministic subset of manifest fields the version hash covers.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionedFields<'a> {
    entry: &'a EntryPoint,
    routes: &'a BTreeMap<String, ManifestEntry>,
    css_bundle_href: &'a Option<String>,
}

/// Compute the content-derived version of a manifest.
///
/// Serializes `{entry, routes, cssBundleHref}` (route keys in BTreeMap
/// order) and truncates the fingerprint to an 8-character uppercase hex
/// prefix. Identical inputs always yield the identical version.
pub fn manifest_version(manifest: &Manifest) -> Result<String, ManifestError> {
    let bytes = serde_json::to_vec(&VersionedFields {
        entry: &manifest.entry,
        routes: &manifest.routes,
        css_bundle_href: &manifest.css_bundle_href,
    })?;
    let mut version = utils::content_fingerprint(&bytes);
    version.truncate(VERSION_WIDTH);
    Ok(version)
}

/// Write the manifest to `<assetsBuildDirectory>/manifest-<VERSION>.js`.
///
/// The file contains exactly one statement: assignment of the serialized
/// manifest to `window.__routeManifest`. The content lands atomically — it
/// is written to a temporary sibling and renamed into place, so the final
/// path either holds the full serialized manifest or does not exist.
/// Versioned filenames make collisions astronomically unlikely; overwriting
/// an existing file of the same name is accepted policy, not an error.
pub(crate) async fn write_assets_manifest(
    manifest: &mut Manifest,
    config: &ManifestConfig,
) -> Result<PathBuf, ManifestError> {
    if manifest.version.is_empty() {
        manifest.version = manifest_version(manifest)?;
    }

    let filename = format!("manifest-{}.js", manifest.version);
    manifest.url = Some(format!("{}{}", config.public_path, filename));

    let statement = format!(
        "window.{MANIFEST_GLOBAL}={};",
        serde_json::to_string(manifest)?
    );

    tokio::fs::create_dir_all(&config.assets_build_directory).await?;

    let path = config.assets_build_directory.join(&filename);
    let staging = path.with_extension("js.tmp");
    tokio::fs::write(&staging, statement.as_bytes()).await?;
    tokio::fs::rename(&staging, &path).await?;

    Ok(path)
}
