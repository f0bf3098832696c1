//! Dependency edges derived from resolved keywords

use std::collections::HashSet;

use serde::Serialize;

use crate::annotation::{Keyword, KeywordError, KeywordKind, ObjectType, ResolvedTarget};
use crate::model::{DatabaseModel, Function, Table};

/// Reference to a schema object or external endpoint.
///
/// `id` is `type.schema.object` in lowercase, with an empty schema for
/// layers and services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaObjectRef {
    pub object_type: ObjectType,
    pub schema: Option<String>,
    pub object: String,
    pub id: String,
}

impl SchemaObjectRef {
    pub fn new(object_type: ObjectType, schema: Option<&str>, object: &str) -> Self {
        let schema = if object_type.is_external() {
            None
        } else {
            schema.map(str::to_string)
        };
        let id = [
            object_type.name().to_lowercase(),
            schema.as_deref().unwrap_or("").to_lowercase(),
            object.to_lowercase(),
        ]
        .join(".");

        Self {
            object_type,
            schema,
            object: object.to_string(),
            id,
        }
    }

    pub fn for_table(table: &Table) -> Self {
        Self::new(ObjectType::from(table.kind), Some(&table.schema), &table.name)
    }

    pub fn for_function(function: &Function) -> Self {
        Self::new(
            ObjectType::Function,
            Some(&function.schema),
            &function.signature,
        )
    }

    /// Reference for a keyword's target: the resolved object when resolution
    /// succeeded, otherwise whatever the annotation spelled out.
    pub fn for_target(keyword: &Keyword) -> Option<Self> {
        if let Some(target) = &keyword.target {
            return Some(match target {
                ResolvedTarget::Relation { kind, schema, name } => {
                    Self::new(ObjectType::from(*kind), Some(schema), name)
                }
                ResolvedTarget::Function { schema, signature } => {
                    Self::new(ObjectType::Function, Some(schema), signature)
                }
                ResolvedTarget::Layer(entry) => Self::new(ObjectType::Layer, None, &entry.name),
                ResolvedTarget::Service(entry) => {
                    Self::new(ObjectType::Service, None, &entry.name)
                }
            });
        }

        let args = keyword.reference()?;
        Some(Self::new(
            ObjectType::from_tag(&args.object_type.value),
            args.schema.as_ref().map(|s| s.value.as_str()),
            &args.object.value,
        ))
    }
}

/// Edge endpoint: the object plus what rendering needs about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEndpoint {
    #[serde(flatten)]
    pub object: SchemaObjectRef,
    pub url: Option<String>,
    pub error: Option<KeywordError>,
    /// Type tag as the annotation spelled it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_type: Option<String>,
}

impl DependencyEndpoint {
    pub fn object(object: SchemaObjectRef) -> Self {
        Self {
            object,
            url: None,
            error: None,
            annotated_type: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.object.id
    }
}

/// "source depends on target"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub source: DependencyEndpoint,
    pub target: DependencyEndpoint,
}

impl DependencyEdge {
    /// Edge for one keyword of `owner`'s comment; `\affects` is reversed
    pub fn from_keyword(owner: &SchemaObjectRef, keyword: &Keyword) -> Option<Self> {
        if !keyword.kind.is_dependency() {
            return None;
        }

        let target = DependencyEndpoint {
            object: SchemaObjectRef::for_target(keyword)?,
            url: keyword
                .target
                .as_ref()
                .and_then(ResolvedTarget::url)
                .map(str::to_string),
            error: keyword.error,
            annotated_type: keyword.reference().map(|args| args.object_type.value.clone()),
        };
        let source = DependencyEndpoint::object(owner.clone());

        Some(match keyword.kind {
            KeywordKind::Affects => Self {
                source: target,
                target: source,
            },
            _ => Self { source, target },
        })
    }
}

/// Every dependency edge in the model, in model order.
///
/// Repeated annotations producing the same (source, target) pair collapse
/// into the first edge.
pub fn collect_edges(model: &DatabaseModel) -> Vec<DependencyEdge> {
    let owners = model
        .tables()
        .map(|t| (SchemaObjectRef::for_table(t), &t.keywords))
        .chain(
            model
                .functions()
                .map(|f| (SchemaObjectRef::for_function(f), &f.keywords)),
        );

    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for (owner, keywords) in owners {
        for keyword in keywords {
            let Some(edge) = DependencyEdge::from_keyword(&owner, keyword) else {
                continue;
            };
            if seen.insert((edge.source.id().to_string(), edge.target.id().to_string())) {
                edges.push(edge);
            }
        }
    }
    edges
}
