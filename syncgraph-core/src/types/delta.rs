//! The result of diffing two [`crate::types::ParsedFile`]s: three lists per
//! entity/relationship kind, computed by identity key and the kind's
//! structural equality rule.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::entities::*;
use super::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindDelta<T> {
    pub added: Vec<T>,
    pub modified: Vec<T>,
    pub removed: Vec<T>,
}

// Hand-written rather than `#[derive(Default)]`: the derive would add a
// `T: Default` bound even though `Vec<T>` needs none, which every entity
// type here (none of which implement `Default`) would then fail to meet.
impl<T> Default for KindDelta<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            modified: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> KindDelta<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }
}

/// Diffs two ordered collections of the same entity kind by identity key,
/// applying the kind's structural equality rule to distinguish "modified"
/// from "unchanged". Added ∩ modified ∩ removed key sets are pairwise
/// disjoint by construction.
pub fn diff_kind<T>(old: &[T], new: &[T]) -> KindDelta<T>
where
    T: Entity + Clone,
{
    let old_by_key: FxHashMap<String, &T> =
        old.iter().map(|e| (e.identity_key(), e)).collect();
    let mut new_by_key: FxHashMap<String, &T> =
        new.iter().map(|e| (e.identity_key(), e)).collect();

    let mut delta = KindDelta::default();

    for (key, old_entity) in &old_by_key {
        match new_by_key.remove(key) {
            None => delta.removed.push((*old_entity).clone()),
            Some(new_entity) => {
                if !old_entity.structurally_eq(new_entity) {
                    delta.modified.push(new_entity.clone());
                }
            }
        }
    }
    // Anything left in new_by_key had no old counterpart: added.
    for (_, new_entity) in new_by_key {
        delta.added.push(new_entity.clone());
    }

    delta
}

/// The full per-file delta across every entity and relationship kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDelta {
    pub functions: KindDelta<FunctionEntity>,
    pub classes: KindDelta<ClassEntity>,
    pub interfaces: KindDelta<InterfaceEntity>,
    pub types: KindDelta<TypeEntity>,
    pub variables: KindDelta<VariableEntity>,
    pub constants: KindDelta<ConstantEntity>,
    pub imports: KindDelta<ImportEntity>,
    pub css_rules: KindDelta<CssRuleEntity>,
    pub jsx_elements: KindDelta<JsxElementEntity>,
    pub function_calls: KindDelta<FunctionCallRelationship>,
    pub type_usages: KindDelta<TypeUsageRelationship>,
    pub extends: KindDelta<ExtendsRelationship>,
    pub implements: KindDelta<ImplementsRelationship>,
    pub references: KindDelta<ReferenceRelationship>,
}

impl EntityDelta {
    /// `has_changes` per §4.2: true iff any of the three lists is
    /// non-empty across any kind.
    pub fn has_changes(&self) -> bool {
        !self.functions.is_empty()
            || !self.classes.is_empty()
            || !self.interfaces.is_empty()
            || !self.types.is_empty()
            || !self.variables.is_empty()
            || !self.constants.is_empty()
            || !self.imports.is_empty()
            || !self.css_rules.is_empty()
            || !self.jsx_elements.is_empty()
            || !self.function_calls.is_empty()
            || !self.type_usages.is_empty()
            || !self.extends.is_empty()
            || !self.implements.is_empty()
            || !self.references.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(name: &str, start: u32) -> FunctionEntity {
        FunctionEntity {
            name: name.to_string(),
            file_path: "a.ts".to_string(),
            start_line: start,
            end_line: start + 2,
            signature: "()".to_string(),
            is_async: false,
            is_exported: true,
        }
    }

    #[test]
    fn identical_entities_produce_no_delta() {
        let old = vec![func("f", 1)];
        let new = vec![func("f", 1)];
        let delta = diff_kind(&old, &new);
        assert!(delta.is_empty());
    }

    #[test]
    fn moved_lines_count_as_modified() {
        let old = vec![func("g", 1)];
        let new = vec![func("g", 5)];
        let delta = diff_kind(&old, &new);
        assert_eq!(delta.modified.len(), 1);
        assert!(delta.added.is_empty());
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn new_function_is_added() {
        let old: Vec<FunctionEntity> = vec![];
        let new = vec![func("f", 1)];
        let delta = diff_kind(&old, &new);
        assert_eq!(delta.added.len(), 1);
    }

    #[test]
    fn missing_function_is_removed() {
        let old = vec![func("f", 1)];
        let new: Vec<FunctionEntity> = vec![];
        let delta = diff_kind(&old, &new);
        assert_eq!(delta.removed.len(), 1);
    }
}
