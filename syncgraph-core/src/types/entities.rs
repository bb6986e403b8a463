//! Entity and relationship types a [`crate::traits::SourceParser`] produces,
//! and the identity/equality rules the differ needs to compute deltas.
//!
//! Each kind's `identity_key` matches the primary key the graph sink
//! upserts by (§4.6); `structural_eq` matches the fields the differ's
//! equality rule compares (§3). Cosmetic fields (doc comments, formatting)
//! are deliberately excluded from both.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An entity or relationship, addressable within its file by a stable
/// string key and comparable for the differ's "did this actually change"
/// rule.
pub trait Entity {
    fn identity_key(&self) -> String;
    fn structurally_eq(&self, other: &Self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntity {
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub signature: String,
    pub is_async: bool,
    pub is_exported: bool,
}

impl Entity for FunctionEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.name, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.end_line == other.end_line
            && self.signature == other.signature
            && self.is_async == other.is_async
            && self.is_exported == other.is_exported
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub is_abstract: bool,
    pub methods: SmallVec<[String; 8]>,
}

impl Entity for ClassEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.name, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.end_line == other.end_line
            && self.is_exported == other.is_exported
            && self.is_abstract == other.is_abstract
            && self.methods == other.methods
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceEntity {
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub members: SmallVec<[String; 8]>,
}

impl Entity for InterfaceEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.name, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.end_line == other.end_line
            && self.is_exported == other.is_exported
            && self.members == other.members
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntity {
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub definition: String,
}

impl Entity for TypeEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.name, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.end_line == other.end_line
            && self.is_exported == other.is_exported
            && self.definition == other.definition
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntity {
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub is_const: bool,
}

impl Entity for VariableEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.name, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.end_line == other.end_line
            && self.is_exported == other.is_exported
            && self.is_const == other.is_const
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantEntity {
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub value: String,
}

impl Entity for ConstantEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.name, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.end_line == other.end_line
            && self.is_exported == other.is_exported
            && self.value == other.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntity {
    pub module_path: String,
    pub file_path: String,
    pub start_line: u32,
    pub imported_names: SmallVec<[String; 4]>,
    pub is_default: bool,
}

impl Entity for ImportEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.module_path, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.imported_names == other.imported_names
            && self.is_default == other.is_default
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssRuleEntity {
    pub selector: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub declarations: SmallVec<[(String, String); 8]>,
}

impl Entity for CssRuleEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}", self.selector, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.end_line == other.end_line
            && self.declarations == other.declarations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsxElementEntity {
    pub tag_name: String,
    pub file_path: String,
    pub line: u32,
    pub attributes: SmallVec<[String; 4]>,
}

impl Entity for JsxElementEntity {
    fn identity_key(&self) -> String {
        format!("{}:{}:{}", self.tag_name, self.file_path, self.line)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallRelationship {
    pub caller: String,
    pub called: String,
    pub file_path: String,
    pub line: u32,
}

impl Entity for FunctionCallRelationship {
    fn identity_key(&self) -> String {
        format!("{}->{}:{}:{}", self.caller, self.called, self.file_path, self.line)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUsageRelationship {
    pub user: String,
    pub used_type: String,
    pub file_path: String,
    pub line: u32,
}

impl Entity for TypeUsageRelationship {
    fn identity_key(&self) -> String {
        format!("{}->{}:{}:{}", self.user, self.used_type, self.file_path, self.line)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendsRelationship {
    pub child: String,
    pub parent: String,
    pub file_path: String,
}

impl Entity for ExtendsRelationship {
    fn identity_key(&self) -> String {
        format!("{}->{}:{}", self.child, self.parent, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementsRelationship {
    pub class_name: String,
    pub interface_name: String,
    pub file_path: String,
}

impl Entity for ImplementsRelationship {
    fn identity_key(&self) -> String {
        format!("{}->{}:{}", self.class_name, self.interface_name, self.file_path)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRelationship {
    pub from: String,
    pub to: String,
    pub file_path: String,
    pub line: u32,
}

impl Entity for ReferenceRelationship {
    fn identity_key(&self) -> String {
        format!("{}->{}:{}:{}", self.from, self.to, self.file_path, self.line)
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self == other
    }
}
