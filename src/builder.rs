//! Manifest assembly.
//!
//! This module walks the bundler's output metadata and produces the raw
//! manifest, then hands it to the optimizer and stamps the version:
//!
//! 1. Group known routes by their originating source file
//! 2. Iterate emitted outputs in lexicographic path order
//! 3. Populate the entry point and one manifest entry per route
//! 4. Prune route imports against ancestor coverage
//! 5. Stamp the content-derived version
//!
//! Only bundle entry points surface in the manifest. An output that is
//! merely imported by an entry point is addressed as a URL inside another
//! entry's import list, never as a top-level manifest entry.

use std::collections::BTreeMap;
use std::path::Path;

use crate::metadata::{
    ACTION_EXPORT, CATCH_BOUNDARY_EXPORT, ERROR_BOUNDARY_EXPORT, LOADER_EXPORT,
};
use crate::{
    optimize, utils, writer, BuildMetadata, Diagnostic, DiagnosticLevel, EntryPoint, ImportKind,
    Manifest, ManifestConfig, ManifestEntry, ManifestError, ManifestOptions, ManifestOutput,
    Route, RouteModuleInspector,
};

/// Assemble the manifest for one build.
///
/// Inspector lookups are awaited inside the deterministic iteration, so
/// every route's raw import list is present before the optimizer runs.
pub(crate) async fn assemble<I>(
    config: &ManifestConfig,
    metadata: &BuildMetadata,
    inspector: &I,
    opts: ManifestOptions,
) -> Result<ManifestOutput, ManifestError>
where
    I: RouteModuleInspector,
{
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    // A single source file may back multiple routes (pathless layout
    // variations), so the grouping value is an ordered collection.
    let mut routes_by_file: BTreeMap<&str, Vec<&Route>> = BTreeMap::new();
    for route in config.routes.values() {
        routes_by_file.entry(route.file.as_str()).or_default().push(route);
    }

    let entry_client = normalize_specifier(&config.entry_client_file);
    let mut entry: Option<EntryPoint> = None;
    let mut manifest_routes: BTreeMap<String, ManifestEntry> = BTreeMap::new();

    // BTreeMap iteration is lexicographic by output path — required so the
    // version hash is reproducible across builds with identical inputs.
    for (output_path, output) in &metadata.outputs {
        let Some(specifier) = output.entry_point.as_deref() else {
            continue;
        };

        let module = utils::resolve_url(
            &config.public_path,
            &config.assets_build_directory,
            Path::new(output_path),
        );

        if normalize_specifier(specifier) == entry_client {
            entry = Some(EntryPoint {
                module,
                imports: static_import_urls(output.imports.iter(), config),
            });
            continue;
        }

        if let Some(file) = utils::extract_route_module_file(specifier) {
            let Some(file_routes) = routes_by_file.get(file) else {
                // The bundling stage guarantees every route-tagged entry
                // point maps to a real route; a miss is a logic defect
                // upstream and aborts the build.
                return Err(ManifestError::RouteModuleWithoutRoute {
                    file: file.to_string(),
                });
            };

            for route in file_routes {
                let exports = inspector.route_exports(&route.id).await?;
                manifest_routes.insert(
                    route.id.clone(),
                    ManifestEntry {
                        id: route.id.clone(),
                        parent_id: route.parent_id.clone(),
                        path: route.path.clone(),
                        index: route.index,
                        case_sensitive: route.case_sensitive,
                        module: module.clone(),
                        imports: Some(static_import_urls(output.imports.iter(), config)),
                        has_action: exports.iter().any(|e| e == ACTION_EXPORT),
                        has_loader: exports.iter().any(|e| e == LOADER_EXPORT),
                        has_catch_boundary: exports.iter().any(|e| e == CATCH_BOUNDARY_EXPORT),
                        has_error_boundary: exports.iter().any(|e| e == ERROR_BOUNDARY_EXPORT),
                    },
                );
            }
            continue;
        }

        // Incidental entry points (e.g. dynamic-import targets) are not
        // browser-loadable route surfaces and never become manifest entries.
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Info,
            message: format!("Ignoring entry point: {specifier}"),
            context: Some(output_path.clone()),
        });
    }

    let entry = entry.ok_or_else(|| ManifestError::MissingClientEntry {
        entry: config.entry_client_file.clone(),
    })?;

    optimize::optimize_routes(&mut manifest_routes, &entry.imports);

    let mut manifest = Manifest {
        version: String::new(),
        entry,
        routes: manifest_routes,
        css_bundle_href: opts.css_bundle_href,
        hmr: opts.hmr,
        url: None,
    };
    manifest.version = writer::manifest_version(&manifest)?;

    diagnostics.push(Diagnostic {
        level: DiagnosticLevel::Info,
        message: format!(
            "Assets manifest assembled: {} routes, version {}",
            manifest.routes.len(),
            manifest.version
        ),
        context: None,
    });

    Ok(ManifestOutput {
        manifest,
        diagnostics,
    })
}

/// Resolve an output's statement-level static imports to browser URLs.
///
/// Dynamic-import edges are deliberately excluded from the eagerly-fetched
/// list — the browser fetches those on demand.
fn static_import_urls<'a>(
    imports: impl Iterator<Item = &'a crate::ImportRecord>,
    config: &ManifestConfig,
) -> Vec<String> {
    imports
        .filter(|record| record.kind == ImportKind::ImportStatement)
        .map(|record| {
            utils::resolve_url(
                &config.public_path,
                &config.assets_build_directory,
                Path::new(&record.path),
            )
        })
        .collect()
}

fn normalize_specifier(specifier: &str) -> String {
    specifier.replace('\\', "/")
}
