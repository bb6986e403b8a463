//! Parse Cache and Differ (§4.2). Holds the last successfully-parsed
//! `ParsedFile` per path; computes an `EntityDelta` against the next
//! parse.
//!
//! The teacher's parse cache (`drift-analysis::parsers::cache::ParseCache`)
//! is a bounded moka LRU keyed by content hash, built for a cache that may
//! hold many unrelated repositories' files and wants eviction. Here size
//! is bounded by the tree's own file count and the key is the path, so a
//! plain map is the correct cache, not a style regression.

use std::sync::RwLock;

use rustc_hash::FxHashMap;
use syncgraph_core::types::{diff_kind, EntityDelta, ParseCacheEntry, ParsedFile};

pub struct Differ {
    cache: RwLock<FxHashMap<String, ParseCacheEntry>>,
}

impl Differ {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Diffs `new_parse` against the cached entry for its path. Updates
    /// the cache iff `has_changes` is true. Returns the delta and whether
    /// anything actually changed.
    pub fn analyze(&self, new_parse: ParsedFile) -> (EntityDelta, bool) {
        let mut cache = self.cache.write().expect("differ lock poisoned");

        let delta = match cache.get(&new_parse.path) {
            None => every_entity_added(&new_parse),
            Some(prior) => EntityDelta {
                functions: diff_kind(&prior.functions, &new_parse.functions),
                classes: diff_kind(&prior.classes, &new_parse.classes),
                interfaces: diff_kind(&prior.interfaces, &new_parse.interfaces),
                types: diff_kind(&prior.types, &new_parse.types),
                variables: diff_kind(&prior.variables, &new_parse.variables),
                constants: diff_kind(&prior.constants, &new_parse.constants),
                imports: diff_kind(&prior.imports, &new_parse.imports),
                css_rules: diff_kind(&prior.css_rules, &new_parse.css_rules),
                jsx_elements: diff_kind(&prior.jsx_elements, &new_parse.jsx_elements),
                function_calls: diff_kind(&prior.function_calls, &new_parse.function_calls),
                type_usages: diff_kind(&prior.type_usages, &new_parse.type_usages),
                extends: diff_kind(&prior.extends, &new_parse.extends),
                implements: diff_kind(&prior.implements, &new_parse.implements),
                references: diff_kind(&prior.references, &new_parse.references),
            },
        };

        let has_changes = delta.has_changes();
        if has_changes {
            cache.insert(new_parse.path.clone(), new_parse);
        }
        (delta, has_changes)
    }

    /// Evicts the cached entry for `path` on file removal.
    pub fn drop_path(&self, path: &str) {
        self.cache.write().expect("differ lock poisoned").remove(path);
    }

    /// No eviction policy; size is bounded by the tree's file count.
    pub fn size(&self) -> usize {
        self.cache.read().expect("differ lock poisoned").len()
    }
}

impl Default for Differ {
    fn default() -> Self {
        Self::new()
    }
}

fn every_entity_added(parse: &ParsedFile) -> EntityDelta {
    EntityDelta {
        functions: all_added(&parse.functions),
        classes: all_added(&parse.classes),
        interfaces: all_added(&parse.interfaces),
        types: all_added(&parse.types),
        variables: all_added(&parse.variables),
        constants: all_added(&parse.constants),
        imports: all_added(&parse.imports),
        css_rules: all_added(&parse.css_rules),
        jsx_elements: all_added(&parse.jsx_elements),
        function_calls: all_added(&parse.function_calls),
        type_usages: all_added(&parse.type_usages),
        extends: all_added(&parse.extends),
        implements: all_added(&parse.implements),
        references: all_added(&parse.references),
    }
}

fn all_added<T: Clone>(items: &[T]) -> syncgraph_core::types::KindDelta<T> {
    syncgraph_core::types::KindDelta {
        added: items.to_vec(),
        modified: Vec::new(),
        removed: Vec::new(),
    }
}
