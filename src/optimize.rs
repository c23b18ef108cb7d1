//! Route-import pruning.
//!
//! Each route's bundle, as emitted, lists every module it statically
//! depends on — including modules already loaded because an ancestor route
//! (or the client entry) loads them. Shipping duplicate URLs wastes a
//! browser fetch/parse cycle, so this pass removes from each route's import
//! list any URL already guaranteed-present via an ancestor.
//!
//! The pass is a memoized top-down recursion over the route tree, parent
//! before child. The memo table maps a route id to the full set of URLs
//! guaranteed loaded once that route is mounted: the entry's imports, every
//! ancestor's surviving imports, and the route's own surviving imports.
//! Filtering a child against that transitive set is what keeps a URL from
//! reappearing two levels below the ancestor that loads it.
//!
//! The memo table is owned by a single pass and dropped with it; nothing
//! persists across builds. Import order is preserved from the bundler's own
//! dependency-resolution order — the pass only removes, never reorders.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ManifestEntry;

/// Prune every route's import list against its ancestors' imports.
///
/// Runs over every route id after assembly completes, guaranteeing full
/// coverage regardless of the visitation order the recursion triggers. A
/// route whose pruned list ends up empty has its `imports` field cleared
/// entirely, so the persisted manifest omits the field rather than carrying
/// an empty list.
pub fn optimize_routes(routes: &mut BTreeMap<String, ManifestEntry>, entry_imports: &[String]) {
    let mut loaded: HashMap<String, Vec<String>> = HashMap::new();
    let ids: Vec<String> = routes.keys().cloned().collect();
    for id in ids {
        optimize_route(&id, routes, entry_imports, &mut loaded);
    }
}

/// Prune one route, recursing into its parent first.
///
/// Returns the URLs guaranteed loaded once this route is mounted. The
/// route's `imports` field is rewritten in place to the surviving subset.
fn optimize_route(
    id: &str,
    routes: &mut BTreeMap<String, ManifestEntry>,
    entry_imports: &[String],
    loaded: &mut HashMap<String, Vec<String>>,
) -> Vec<String> {
    if let Some(cached) = loaded.get(id) {
        return cached.clone();
    }

    let parent_id = routes.get(id).and_then(|route| route.parent_id.clone());
    let parent_loaded = match parent_id {
        Some(parent_id) => optimize_route(&parent_id, routes, entry_imports, loaded),
        None => Vec::new(),
    };

    // Ancestor coverage: entry imports plus everything the parent chain
    // loads, order-preserving with set semantics.
    let mut coverage = Vec::with_capacity(entry_imports.len() + parent_loaded.len());
    let mut seen: HashSet<&str> = HashSet::new();
    for url in entry_imports.iter().chain(parent_loaded.iter()) {
        if seen.insert(url) {
            coverage.push(url.clone());
        }
    }

    let kept = match routes.get_mut(id) {
        Some(route) => {
            let raw = route.imports.take().unwrap_or_default();
            let kept: Vec<String> = raw
                .into_iter()
                .filter(|url| !seen.contains(url.as_str()))
                .collect();
            route.imports = if kept.is_empty() {
                None
            } else {
                Some(kept.clone())
            };
            kept
        }
        // Dangling parent ids are ruled out upstream; an unknown id
        // contributes nothing beyond the coverage already computed.
        None => Vec::new(),
    };

    let mut result = coverage;
    result.extend(kept);
    loaded.insert(id.to_string(), result.clone());
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
