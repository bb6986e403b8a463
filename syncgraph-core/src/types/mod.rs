pub mod delta;
pub mod entities;
pub mod events;

pub use delta::{diff_kind, EntityDelta, KindDelta};
pub use entities::{
    ClassEntity, ConstantEntity, CssRuleEntity, Entity, ExtendsRelationship,
    FunctionCallRelationship, FunctionEntity, ImplementsRelationship, ImportEntity,
    InterfaceEntity, JsxElementEntity, ReferenceRelationship, TypeEntity, TypeUsageRelationship,
    VariableEntity,
};
pub use events::{BatchMetrics, ChangeEvent, ChangeKind};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Language tag a [`crate::traits::SourceParser`] assigns to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    TypeScript,
    JavaScript,
    Css,
}

/// One per tracked file: content hash + mtime, sufficient to decide
/// equality without re-parsing. See §4.1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub path: PathBuf,
    /// 128-bit content digest, hex-encoded for the on-disk form.
    pub content_hash: u128,
    /// Seconds since epoch at the moment `content_hash` was computed.
    pub mtime: i64,
}

/// Whether a path has changed since its last recorded fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Yes,
    No,
    Missing,
}

/// Output of the external source parser for one file: the entity and
/// relationship collections declared in that file, plus its language tag.
/// `path` is rebased to be relative to the watched root before the engine
/// hands this to the differ or a sink (§4.7 step 5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: String,
    pub language: Option<Language>,
    pub functions: Vec<FunctionEntity>,
    pub classes: Vec<ClassEntity>,
    pub interfaces: Vec<InterfaceEntity>,
    pub types: Vec<TypeEntity>,
    pub variables: Vec<VariableEntity>,
    pub constants: Vec<ConstantEntity>,
    pub imports: Vec<ImportEntity>,
    pub css_rules: Vec<CssRuleEntity>,
    pub jsx_elements: Vec<JsxElementEntity>,
    pub function_calls: Vec<FunctionCallRelationship>,
    pub type_usages: Vec<TypeUsageRelationship>,
    pub extends: Vec<ExtendsRelationship>,
    pub implements: Vec<ImplementsRelationship>,
    pub references: Vec<ReferenceRelationship>,
}

/// Per-file, holds the most recent *successful* [`ParsedFile`]. Absence
/// means first observation: every entity in the next parse is "added".
pub type ParseCacheEntry = ParsedFile;
