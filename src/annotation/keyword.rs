//! Keyword records produced by the annotation parser

use std::fmt;
use std::ops::Range;

use serde::{Serialize, Serializer};

use crate::config::RegistryEntry;
use crate::model::TableKind;

/// Which annotation keyword a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordKind {
    Depends,
    Affects,
    Param,
    /// Any other backslash token
    Unknown,
}

impl KeywordKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "\\depends" => KeywordKind::Depends,
            "\\affects" => KeywordKind::Affects,
            "\\param" => KeywordKind::Param,
            _ => KeywordKind::Unknown,
        }
    }

    pub fn is_dependency(&self) -> bool {
        matches!(self, KeywordKind::Depends | KeywordKind::Affects)
    }
}

/// Per-keyword status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeywordError {
    ArgsParseError,
    UnexpectedKeyword,
    SchemaRequired,
    NoSuchSchema,
    NoSuchTableOrView,
    NoSuchFunction,
    NoSuchLayer,
    NoSuchService,
    UnexpectedObjectType,
}

impl KeywordError {
    pub fn code(&self) -> &'static str {
        match self {
            KeywordError::ArgsParseError => "ARGS_PARSE_ERROR",
            KeywordError::UnexpectedKeyword => "UNEXPECTED_KEYWORD",
            KeywordError::SchemaRequired => "SCHEMA_REQUIRED",
            KeywordError::NoSuchSchema => "NO_SUCH_SCHEMA",
            KeywordError::NoSuchTableOrView => "NO_SUCH_TABLE_OR_VIEW",
            KeywordError::NoSuchFunction => "NO_SUCH_FUNCTION",
            KeywordError::NoSuchLayer => "NO_SUCH_LAYER",
            KeywordError::NoSuchService => "NO_SUCH_SERVICE",
            KeywordError::UnexpectedObjectType => "UNEXPECTED_OBJECT_TYPE",
        }
    }
}

impl fmt::Display for KeywordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Type of an object an annotation can point at
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Table,
    View,
    MaterializedView,
    ForeignTable,
    Special,
    Function,
    Layer,
    Service,
    /// Tag written in a comment that names no known object type
    Unknown(String),
}

impl ObjectType {
    /// Map the case-sensitive tag used in `\depends TAG:...`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "TABLE" => ObjectType::Table,
            "VIEW" => ObjectType::View,
            "MATVIEW" => ObjectType::MaterializedView,
            "FOREIGN_TABLE" => ObjectType::ForeignTable,
            "SPECIAL" => ObjectType::Special,
            "FUNCTION" => ObjectType::Function,
            "LAYER" => ObjectType::Layer,
            "SERVICE" => ObjectType::Service,
            other => ObjectType::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::View => "VIEW",
            ObjectType::MaterializedView => "MATERIALIZED VIEW",
            ObjectType::ForeignTable => "FOREIGN TABLE",
            ObjectType::Special => "SPECIAL",
            ObjectType::Function => "FUNCTION",
            ObjectType::Layer => "LAYER",
            ObjectType::Service => "SERVICE",
            ObjectType::Unknown(tag) => tag,
        }
    }

    /// Table-like types are resolved against the metadata model
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            ObjectType::Table
                | ObjectType::View
                | ObjectType::MaterializedView
                | ObjectType::ForeignTable
                | ObjectType::Special
        )
    }

    /// Layers and services live outside the database
    pub fn is_external(&self) -> bool {
        matches!(self, ObjectType::Layer | ObjectType::Service)
    }
}

impl From<TableKind> for ObjectType {
    fn from(kind: TableKind) -> Self {
        match kind {
            TableKind::Table => ObjectType::Table,
            TableKind::View => ObjectType::View,
            TableKind::MaterializedView => ObjectType::MaterializedView,
            TableKind::ForeignTable => ObjectType::ForeignTable,
            TableKind::Special => ObjectType::Special,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ObjectType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One argument value with its absolute byte offset in the comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgSpan {
    pub value: String,
    pub position: usize,
    pub length: usize,
}

/// Arguments of `\depends` / `\affects`: `TYPE: [schema.]object`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceArgs {
    pub object_type: ArgSpan,
    pub schema: Option<ArgSpan>,
    pub object: ArgSpan,
}

/// Arguments of `\param`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamArgs {
    pub name: ArgSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KeywordArgs {
    Reference(ReferenceArgs),
    Param(ParamArgs),
}

/// What a dependency keyword was resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "lowercase")]
pub enum ResolvedTarget {
    /// Table-like relation; `kind` is the stored kind, not the annotated tag
    Relation {
        kind: TableKind,
        schema: String,
        name: String,
    },
    Function { schema: String, signature: String },
    Layer(RegistryEntry),
    Service(RegistryEntry),
}

impl ResolvedTarget {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ResolvedTarget::Relation { kind, .. } => ObjectType::from(*kind),
            ResolvedTarget::Function { .. } => ObjectType::Function,
            ResolvedTarget::Layer(_) => ObjectType::Layer,
            ResolvedTarget::Service(_) => ObjectType::Service,
        }
    }

    /// URL of an external endpoint
    pub fn url(&self) -> Option<&str> {
        match self {
            ResolvedTarget::Layer(entry) | ResolvedTarget::Service(entry) => Some(&entry.url),
            _ => None,
        }
    }
}

/// One backslash token found in a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    /// Token text including the backslash, e.g. `\depends`
    pub name: String,
    pub kind: KeywordKind,
    /// Byte offset of the backslash
    pub position: usize,
    /// Length of the token alone
    pub length: usize,
    /// Length of the token plus its parsed arguments
    pub length_with_args: usize,
    pub args: Option<KeywordArgs>,
    pub error: Option<KeywordError>,
    pub target: Option<ResolvedTarget>,
}

impl Keyword {
    /// Byte range covered by the token and its arguments
    pub fn span(&self) -> Range<usize> {
        self.position..self.position + self.length_with_args
    }

    pub fn reference(&self) -> Option<&ReferenceArgs> {
        match &self.args {
            Some(KeywordArgs::Reference(args)) => Some(args),
            _ => None,
        }
    }

    pub fn param(&self) -> Option<&ParamArgs> {
        match &self.args {
            Some(KeywordArgs::Param(args)) => Some(args),
            _ => None,
        }
    }

    /// Resolved type of the referenced object, if resolution succeeded
    pub fn target_type(&self) -> Option<ObjectType> {
        self.target.as_ref().map(ResolvedTarget::object_type)
    }
}
