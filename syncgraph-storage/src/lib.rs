//! Reference [`GraphSink`] drivers. No production driver (graph DB /
//! SQL-property-graph / relational engine) lives here — those remain out
//! of scope; this crate exists to make the engine's invariants
//! mechanically testable and to give the CLI a sink that works with zero
//! external setup.
//!
//! Grounded on the teacher's `DriftStorageEngine` shape (engine wraps a
//! connection and exposes the same capability surface its trait defines)
//! generalized down to an in-memory map, since no SQL engine is in scope
//! here.

use std::sync::Mutex;

use rustc_hash::FxHashMap;
use syncgraph_core::errors::SinkError;
use syncgraph_core::traits::GraphSink;
use syncgraph_core::types::{
    ClassEntity, ConstantEntity, CssRuleEntity, Entity, ExtendsRelationship,
    FunctionCallRelationship, FunctionEntity, ImplementsRelationship, ImportEntity,
    InterfaceEntity, JsxElementEntity, Language, ReferenceRelationship, TypeEntity,
    TypeUsageRelationship, VariableEntity,
};

#[derive(Default)]
struct Store {
    files: FxHashMap<String, Language>,
    functions: FxHashMap<String, FunctionEntity>,
    classes: FxHashMap<String, ClassEntity>,
    interfaces: FxHashMap<String, InterfaceEntity>,
    types: FxHashMap<String, TypeEntity>,
    variables: FxHashMap<String, VariableEntity>,
    constants: FxHashMap<String, ConstantEntity>,
    imports: FxHashMap<String, ImportEntity>,
    css_rules: FxHashMap<String, CssRuleEntity>,
    jsx_elements: FxHashMap<String, JsxElementEntity>,
    function_calls: FxHashMap<String, FunctionCallRelationship>,
    type_usages: FxHashMap<String, TypeUsageRelationship>,
    extends: FxHashMap<String, ExtendsRelationship>,
    implements: FxHashMap<String, ImplementsRelationship>,
    references: FxHashMap<String, ReferenceRelationship>,
}

/// Every upsert is an idempotent overwrite keyed by the entity's identity
/// key, satisfying §4.6's retry-safety requirement trivially.
pub struct InMemoryGraphSink {
    store: Mutex<Store>,
}

impl InMemoryGraphSink {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
        }
    }

    pub fn function_count(&self) -> usize {
        self.store.lock().expect("store lock poisoned").functions.len()
    }

    pub fn class_count(&self) -> usize {
        self.store.lock().expect("store lock poisoned").classes.len()
    }

    pub fn file_count(&self) -> usize {
        self.store.lock().expect("store lock poisoned").files.len()
    }

    pub fn has_function(&self, name: &str, file_path: &str) -> bool {
        self.store
            .lock()
            .expect("store lock poisoned")
            .functions
            .contains_key(&format!("{name}:{file_path}"))
    }

    pub fn total_upserts(&self) -> usize {
        let s = self.store.lock().expect("store lock poisoned");
        s.functions.len()
            + s.classes.len()
            + s.interfaces.len()
            + s.types.len()
            + s.variables.len()
            + s.constants.len()
            + s.imports.len()
            + s.css_rules.len()
            + s.jsx_elements.len()
            + s.function_calls.len()
            + s.type_usages.len()
            + s.extends.len()
            + s.implements.len()
            + s.references.len()
    }
}

impl Default for InMemoryGraphSink {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! upsert_method {
    ($name:ident, $field:ident, $ty:ty) => {
        fn $name(&self, entity: &$ty) -> Result<(), SinkError> {
            self.store
                .lock()
                .expect("store lock poisoned")
                .$field
                .insert(entity.identity_key(), entity.clone());
            Ok(())
        }
    };
}

impl GraphSink for InMemoryGraphSink {
    fn upsert_file(&self, path: &str, language: Language) -> Result<(), SinkError> {
        self.store
            .lock()
            .expect("store lock poisoned")
            .files
            .insert(path.to_string(), language);
        Ok(())
    }

    upsert_method!(upsert_function, functions, FunctionEntity);
    upsert_method!(upsert_class, classes, ClassEntity);
    upsert_method!(upsert_interface, interfaces, InterfaceEntity);
    upsert_method!(upsert_type, types, TypeEntity);
    upsert_method!(upsert_variable, variables, VariableEntity);
    upsert_method!(upsert_constant, constants, ConstantEntity);
    upsert_method!(upsert_import, imports, ImportEntity);
    upsert_method!(upsert_css_rule, css_rules, CssRuleEntity);
    upsert_method!(upsert_jsx_element, jsx_elements, JsxElementEntity);
    upsert_method!(upsert_function_call, function_calls, FunctionCallRelationship);
    upsert_method!(upsert_type_usage, type_usages, TypeUsageRelationship);
    upsert_method!(upsert_extends, extends, ExtendsRelationship);
    upsert_method!(upsert_implements, implements, ImplementsRelationship);
    upsert_method!(upsert_reference, references, ReferenceRelationship);

    fn remove_file(&self, path: &str) -> Result<(), SinkError> {
        self.store.lock().expect("store lock poisoned").files.remove(path);
        Ok(())
    }

    fn create_indexes(&self) -> Result<(), SinkError> {
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Accepts and logs every operation. Used for throughput benches and
/// smoke-running the pipeline with no storage at all.
#[derive(Default)]
pub struct NullGraphSink;

impl GraphSink for NullGraphSink {
    fn upsert_file(&self, path: &str, language: Language) -> Result<(), SinkError> {
        tracing::trace!(path, ?language, "null sink: upsert_file");
        Ok(())
    }

    fn upsert_function(&self, entity: &FunctionEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_function");
        Ok(())
    }

    fn upsert_class(&self, entity: &ClassEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_class");
        Ok(())
    }

    fn upsert_interface(&self, entity: &InterfaceEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_interface");
        Ok(())
    }

    fn upsert_type(&self, entity: &TypeEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_type");
        Ok(())
    }

    fn upsert_variable(&self, entity: &VariableEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_variable");
        Ok(())
    }

    fn upsert_constant(&self, entity: &ConstantEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_constant");
        Ok(())
    }

    fn upsert_import(&self, entity: &ImportEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_import");
        Ok(())
    }

    fn upsert_css_rule(&self, entity: &CssRuleEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_css_rule");
        Ok(())
    }

    fn upsert_jsx_element(&self, entity: &JsxElementEntity) -> Result<(), SinkError> {
        tracing::trace!(key = %entity.identity_key(), "null sink: upsert_jsx_element");
        Ok(())
    }

    fn upsert_function_call(&self, rel: &FunctionCallRelationship) -> Result<(), SinkError> {
        tracing::trace!(key = %rel.identity_key(), "null sink: upsert_function_call");
        Ok(())
    }

    fn upsert_type_usage(&self, rel: &TypeUsageRelationship) -> Result<(), SinkError> {
        tracing::trace!(key = %rel.identity_key(), "null sink: upsert_type_usage");
        Ok(())
    }

    fn upsert_extends(&self, rel: &ExtendsRelationship) -> Result<(), SinkError> {
        tracing::trace!(key = %rel.identity_key(), "null sink: upsert_extends");
        Ok(())
    }

    fn upsert_implements(&self, rel: &ImplementsRelationship) -> Result<(), SinkError> {
        tracing::trace!(key = %rel.identity_key(), "null sink: upsert_implements");
        Ok(())
    }

    fn upsert_reference(&self, rel: &ReferenceRelationship) -> Result<(), SinkError> {
        tracing::trace!(key = %rel.identity_key(), "null sink: upsert_reference");
        Ok(())
    }

    fn create_indexes(&self) -> Result<(), SinkError> {
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str) -> FunctionEntity {
        FunctionEntity {
            name: name.to_string(),
            file_path: "a.ts".to_string(),
            start_line: 1,
            end_line: 3,
            signature: "()".to_string(),
            is_async: false,
            is_exported: true,
        }
    }

    #[test]
    fn upsert_is_idempotent_overwrite() {
        let sink = InMemoryGraphSink::new();
        sink.upsert_function(&function("f")).unwrap();
        sink.upsert_function(&function("f")).unwrap();
        assert_eq!(sink.function_count(), 1);
    }

    #[test]
    fn distinct_identity_keys_accumulate() {
        let sink = InMemoryGraphSink::new();
        sink.upsert_function(&function("f")).unwrap();
        sink.upsert_function(&function("g")).unwrap();
        assert_eq!(sink.function_count(), 2);
    }

    #[test]
    fn upsert_file_tracks_language() {
        let sink = InMemoryGraphSink::new();
        sink.upsert_file("a.ts", Language::TypeScript).unwrap();
        assert_eq!(sink.file_count(), 1);
    }
}
