//! Utility functions for the manifest pipeline.
//!
//! - Route-module specifier tagging and parsing
//! - Output-path → browser-URL resolution
//! - Content fingerprinting for version stamps

use std::path::Path;

use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Route-module specifiers
// ---------------------------------------------------------------------------

/// Prefix tagging a bundle entry specifier as a route module.
/// Reserved for this purpose only; never collides with a real file path.
pub const ROUTE_MODULE_PREFIX: &str = "route-module:";

/// Suffix closing a route-module specifier.
pub const ROUTE_MODULE_SUFFIX: &str = "?route";

/// Create the tagged specifier for a route's source file.
pub fn route_module_specifier(file: &str) -> String {
    format!("{ROUTE_MODULE_PREFIX}{file}{ROUTE_MODULE_SUFFIX}")
}

/// Extract the originating source file from a tagged route-module specifier.
/// Returns `None` if the specifier doesn't carry both the prefix and suffix.
pub fn extract_route_module_file(specifier: &str) -> Option<&str> {
    specifier
        .strip_prefix(ROUTE_MODULE_PREFIX)?
        .strip_suffix(ROUTE_MODULE_SUFFIX)
}

/// Check if a specifier is a tagged route module.
pub fn is_route_module(specifier: &str) -> bool {
    extract_route_module_file(specifier).is_some()
}

// ---------------------------------------------------------------------------
// URL resolution
// ---------------------------------------------------------------------------

/// Map an on-disk output path to its public browser URL.
///
/// The URL is the path relative to the assets build directory, appended to
/// the public base path, with separators normalized to `/` regardless of
/// the host OS convention. A malformed input yields a malformed but
/// deterministic URL — inputs originate from trusted build output and are
/// not defended against.
pub fn resolve_url(public_path: &str, assets_build_directory: &Path, output_path: &Path) -> String {
    let relative = output_path
        .strip_prefix(assets_build_directory)
        .unwrap_or(output_path);
    let relative = relative.to_string_lossy().replace('\\', "/");
    let relative = relative.strip_prefix("./").unwrap_or(&relative);
    format!("{public_path}{relative}")
}

// ---------------------------------------------------------------------------
// Content fingerprinting
// ---------------------------------------------------------------------------

/// Produce a deterministic uppercase hex fingerprint of `content`.
///
/// Full SHA-256 digest; callers truncate to the width they need.
pub fn content_fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize()).to_uppercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_module_specifier() {
        assert_eq!(
            route_module_specifier("app/routes/index.tsx"),
            "route-module:app/routes/index.tsx?route"
        );
    }

    #[test]
    fn test_extract_route_module_file() {
        assert_eq!(
            extract_route_module_file("route-module:app/routes/index.tsx?route"),
            Some("app/routes/index.tsx")
        );
        assert_eq!(extract_route_module_file("app/entry.client.tsx"), None);
        assert_eq!(extract_route_module_file("route-module:missing-suffix"), None);
        assert_eq!(extract_route_module_file("no-prefix?route"), None);
    }

    #[test]
    fn test_is_route_module() {
        assert!(is_route_module("route-module:a.tsx?route"));
        assert!(!is_route_module("a.tsx"));
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url(
                "/build/",
                Path::new("public/build"),
                Path::new("public/build/entry.client-ABC.js")
            ),
            "/build/entry.client-ABC.js"
        );
    }

    #[test]
    fn test_resolve_url_nested_output() {
        assert_eq!(
            resolve_url(
                "/build/",
                Path::new("public/build"),
                Path::new("public/build/routes/index-DEF.js")
            ),
            "/build/routes/index-DEF.js"
        );
    }

    #[test]
    fn test_resolve_url_normalizes_backslashes() {
        // Windows-style output paths must still produce forward-slash URLs.
        assert_eq!(
            resolve_url(
                "/build/",
                Path::new("out"),
                Path::new(r"out\routes\index.js")
            )
            .matches('\\')
            .count(),
            0
        );
    }

    #[test]
    fn test_resolve_url_outside_assets_dir_is_deterministic() {
        // Garbage in, garbage out — but the same garbage every time.
        let a = resolve_url("/build/", Path::new("public/build"), Path::new("elsewhere/x.js"));
        let b = resolve_url("/build/", Path::new("public/build"), Path::new("elsewhere/x.js"));
        assert_eq!(a, b);
        assert_eq!(a, "/build/elsewhere/x.js");
    }

    #[test]
    fn test_content_fingerprint_deterministic() {
        assert_eq!(content_fingerprint(b"abc"), content_fingerprint(b"abc"));
        assert_ne!(content_fingerprint(b"abc"), content_fingerprint(b"abd"));
    }

    #[test]
    fn test_content_fingerprint_shape() {
        let fp = content_fingerprint(b"abc");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
