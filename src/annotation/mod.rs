//! Comment annotations: keyword parsing and target resolution

mod keyword;
mod parser;
mod resolver;

use tracing::info;

use crate::config::Registries;
use crate::model::DatabaseModel;

pub use keyword::{
    ArgSpan, Keyword, KeywordArgs, KeywordError, KeywordKind, ObjectType, ParamArgs,
    ReferenceArgs, ResolvedTarget,
};
pub use parser::parse_comment;
pub use resolver::TargetResolver;

/// Parse and resolve the keywords of one comment
pub fn annotate_comment(
    comment: Option<&str>,
    allow_param: bool,
    resolver: &TargetResolver,
) -> Vec<Keyword> {
    let mut keywords = parse_comment(comment, allow_param);
    resolver.resolve_all(&mut keywords);
    keywords
}

/// Parse and resolve every table description and function comment,
/// storing the keywords on their owning object.
///
/// Re-running on the same model replaces the previous keywords.
pub fn annotate_model(model: &mut DatabaseModel, registries: &Registries) {
    let (table_keywords, function_keywords) = {
        let resolver = TargetResolver::new(model, registries);
        let tables: Vec<Vec<Keyword>> = model
            .tables()
            .map(|t| annotate_comment(t.description.as_deref(), false, &resolver))
            .collect();
        let functions: Vec<Vec<Keyword>> = model
            .functions()
            .map(|f| annotate_comment(f.comment.as_deref(), true, &resolver))
            .collect();
        (tables, functions)
    };

    let mut total = 0;
    let mut errors = 0;
    for keywords in table_keywords.iter().chain(&function_keywords) {
        total += keywords.len();
        errors += keywords.iter().filter(|k| k.error.is_some()).count();
    }

    for (table, keywords) in model.tables_mut().zip(table_keywords) {
        table.keywords = keywords;
    }
    for (function, keywords) in model.functions_mut().zip(function_keywords) {
        function.keywords = keywords;
    }

    info!("Parsed {} annotation keywords ({} with errors)", total, errors);
}
