//! Target resolution for `\depends` / `\affects`

use tracing::debug;

use crate::config::Registries;
use crate::model::DatabaseModel;

use super::{Keyword, KeywordError, ObjectType, ReferenceArgs, ResolvedTarget};

/// Resolves dependency keywords against the model and the registries.
///
/// Resolution never fails: the outcome is written to the keyword as either
/// a target or an error code.
pub struct TargetResolver<'a> {
    model: &'a DatabaseModel,
    registries: &'a Registries,
}

impl<'a> TargetResolver<'a> {
    pub fn new(model: &'a DatabaseModel, registries: &'a Registries) -> Self {
        Self { model, registries }
    }

    pub fn resolve_all(&self, keywords: &mut [Keyword]) {
        for keyword in keywords {
            self.resolve(keyword);
        }
    }

    /// Fill in `target` or `error` of one keyword.
    ///
    /// Keywords that already carry an error, and non-dependency keywords,
    /// are left untouched.
    pub fn resolve(&self, keyword: &mut Keyword) {
        if keyword.error.is_some() || !keyword.kind.is_dependency() {
            return;
        }
        let Some(args) = keyword.reference() else {
            return;
        };

        match self.resolve_reference(args) {
            Ok(target) => keyword.target = Some(target),
            Err(error) => {
                debug!(
                    "{} {}:{} at {} -> {}",
                    keyword.name,
                    args.object_type.value,
                    args.object.value,
                    keyword.position,
                    error
                );
                keyword.error = Some(error);
            }
        }
    }

    pub fn resolve_reference(&self, args: &ReferenceArgs) -> Result<ResolvedTarget, KeywordError> {
        let object_type = ObjectType::from_tag(&args.object_type.value);
        let schema = args.schema.as_ref().map(|s| s.value.as_str());
        let object = args.object.value.as_str();

        match object_type {
            t if t.is_relation() => {
                let schema = self.require_schema(schema)?;
                let table = self
                    .model
                    .table(schema, object)
                    .ok_or(KeywordError::NoSuchTableOrView)?;
                Ok(ResolvedTarget::Relation {
                    kind: table.kind,
                    schema: table.schema.clone(),
                    name: table.name.clone(),
                })
            }
            ObjectType::Function => {
                let schema = self.require_schema(schema)?;
                let function = self
                    .model
                    .function_named(schema, object)
                    .ok_or(KeywordError::NoSuchFunction)?;
                Ok(ResolvedTarget::Function {
                    schema: function.schema.clone(),
                    signature: function.signature.clone(),
                })
            }
            ObjectType::Layer => self
                .registries
                .layer(object)
                .cloned()
                .map(ResolvedTarget::Layer)
                .ok_or(KeywordError::NoSuchLayer),
            ObjectType::Service => self
                .registries
                .service(object)
                .cloned()
                .map(ResolvedTarget::Service)
                .ok_or(KeywordError::NoSuchService),
            _ => Err(KeywordError::UnexpectedObjectType),
        }
    }

    fn require_schema<'s>(&self, schema: Option<&'s str>) -> Result<&'s str, KeywordError> {
        let schema = schema.ok_or(KeywordError::SchemaRequired)?;
        if !self.model.schema_exists(schema) {
            return Err(KeywordError::NoSuchSchema);
        }
        Ok(schema)
    }
}
