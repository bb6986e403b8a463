//! The Graph Sink capability (§4.6): a thin interface any of several
//! concrete drivers (labelled-graph DB, SQL-property-graph extension,
//! relational-property-graph engine) implements. The engine treats every
//! driver uniformly and never matches on its concrete type — that
//! replaces the type-switch anti-pattern flagged in the design notes.

use std::sync::Arc;

use crate::errors::SinkError;
use crate::types::{
    ClassEntity, ConstantEntity, CssRuleEntity, ExtendsRelationship, FunctionCallRelationship,
    FunctionEntity, ImplementsRelationship, ImportEntity, InterfaceEntity, JsxElementEntity,
    Language, ReferenceRelationship, TypeEntity, TypeUsageRelationship, VariableEntity,
};

/// Every operation must be safe to retry: upserts are idempotent, keyed by
/// each kind's identity key. The engine does not require transactionality
/// across operations within one file — only the ordering file, then
/// entities, then relationships, so edge endpoints exist before an edge is
/// attempted.
pub trait GraphSink: Send + Sync {
    fn upsert_file(&self, path: &str, language: Language) -> Result<(), SinkError>;

    fn upsert_function(&self, entity: &FunctionEntity) -> Result<(), SinkError>;
    fn upsert_class(&self, entity: &ClassEntity) -> Result<(), SinkError>;
    fn upsert_interface(&self, entity: &InterfaceEntity) -> Result<(), SinkError>;
    fn upsert_type(&self, entity: &TypeEntity) -> Result<(), SinkError>;
    fn upsert_variable(&self, entity: &VariableEntity) -> Result<(), SinkError>;
    fn upsert_constant(&self, entity: &ConstantEntity) -> Result<(), SinkError>;
    fn upsert_import(&self, entity: &ImportEntity) -> Result<(), SinkError>;
    fn upsert_css_rule(&self, entity: &CssRuleEntity) -> Result<(), SinkError>;
    fn upsert_jsx_element(&self, entity: &JsxElementEntity) -> Result<(), SinkError>;

    fn upsert_function_call(&self, rel: &FunctionCallRelationship) -> Result<(), SinkError>;
    fn upsert_type_usage(&self, rel: &TypeUsageRelationship) -> Result<(), SinkError>;
    fn upsert_extends(&self, rel: &ExtendsRelationship) -> Result<(), SinkError>;
    fn upsert_implements(&self, rel: &ImplementsRelationship) -> Result<(), SinkError>;
    fn upsert_reference(&self, rel: &ReferenceRelationship) -> Result<(), SinkError>;

    /// Remove every entity and relationship previously upserted for `path`,
    /// plus the file node itself. Authoritative deletion on file removal is
    /// out of scope (§9 open question 1) — drivers are not required to
    /// implement this as anything other than a no-op; the engine never
    /// calls it from the core pipeline today, it exists for drivers that
    /// choose to support it.
    fn remove_file(&self, path: &str) -> Result<(), SinkError> {
        let _ = path;
        Ok(())
    }

    /// Idempotent schema setup.
    fn create_indexes(&self) -> Result<(), SinkError>;

    /// Releases resources. Failures here are the only sink-side failures
    /// that propagate out of [`crate::SyncError`] at shutdown.
    fn close(&self) -> Result<(), SinkError>;
}

impl<T> GraphSink for Arc<T>
where
    T: GraphSink + ?Sized,
{
    fn upsert_file(&self, path: &str, language: Language) -> Result<(), SinkError> {
        (**self).upsert_file(path, language)
    }

    fn upsert_function(&self, entity: &FunctionEntity) -> Result<(), SinkError> {
        (**self).upsert_function(entity)
    }

    fn upsert_class(&self, entity: &ClassEntity) -> Result<(), SinkError> {
        (**self).upsert_class(entity)
    }

    fn upsert_interface(&self, entity: &InterfaceEntity) -> Result<(), SinkError> {
        (**self).upsert_interface(entity)
    }

    fn upsert_type(&self, entity: &TypeEntity) -> Result<(), SinkError> {
        (**self).upsert_type(entity)
    }

    fn upsert_variable(&self, entity: &VariableEntity) -> Result<(), SinkError> {
        (**self).upsert_variable(entity)
    }

    fn upsert_constant(&self, entity: &ConstantEntity) -> Result<(), SinkError> {
        (**self).upsert_constant(entity)
    }

    fn upsert_import(&self, entity: &ImportEntity) -> Result<(), SinkError> {
        (**self).upsert_import(entity)
    }

    fn upsert_css_rule(&self, entity: &CssRuleEntity) -> Result<(), SinkError> {
        (**self).upsert_css_rule(entity)
    }

    fn upsert_jsx_element(&self, entity: &JsxElementEntity) -> Result<(), SinkError> {
        (**self).upsert_jsx_element(entity)
    }

    fn upsert_function_call(&self, rel: &FunctionCallRelationship) -> Result<(), SinkError> {
        (**self).upsert_function_call(rel)
    }

    fn upsert_type_usage(&self, rel: &TypeUsageRelationship) -> Result<(), SinkError> {
        (**self).upsert_type_usage(rel)
    }

    fn upsert_extends(&self, rel: &ExtendsRelationship) -> Result<(), SinkError> {
        (**self).upsert_extends(rel)
    }

    fn upsert_implements(&self, rel: &ImplementsRelationship) -> Result<(), SinkError> {
        (**self).upsert_implements(rel)
    }

    fn upsert_reference(&self, rel: &ReferenceRelationship) -> Result<(), SinkError> {
        (**self).upsert_reference(rel)
    }

    fn remove_file(&self, path: &str) -> Result<(), SinkError> {
        (**self).remove_file(path)
    }

    fn create_indexes(&self) -> Result<(), SinkError> {
        (**self).create_indexes()
    }

    fn close(&self) -> Result<(), SinkError> {
        (**self).close()
    }
}
