//! Dependency section rendering

use super::{object_anchor, Locale, Markup};
use crate::dependency::{DependencyEndpoint, DependencyForest, ForestNode};

/// Render the forest as nested lists, roots first. `None` for an empty
/// forest.
pub fn render_forest(
    forest: &DependencyForest,
    markup: &dyn Markup,
    locale: Locale,
) -> Option<String> {
    if forest.is_empty() {
        return None;
    }
    let items: Vec<String> = forest
        .roots
        .values()
        .map(|root| render_node(root, markup, locale))
        .collect();
    Some(markup.list(&items))
}

fn render_node(node: &ForestNode, markup: &dyn Markup, locale: Locale) -> String {
    let mut item = endpoint_label(&node.attr, markup, locale);
    if !node.children.is_empty() {
        let children: Vec<String> = node
            .children
            .values()
            .map(|child| render_node(child, markup, locale))
            .collect();
        item.push('\n');
        item.push_str(&markup.list(&children));
    }
    item
}

fn endpoint_label(endpoint: &DependencyEndpoint, markup: &dyn Markup, locale: Locale) -> String {
    let object = &endpoint.object;

    if let Some(error) = endpoint.error {
        let tag = endpoint
            .annotated_type
            .clone()
            .unwrap_or_else(|| object.object_type.to_string());
        let written = match &object.schema {
            Some(schema) => format!("{}:{}.{}", tag, schema, object.object),
            None => format!("{}:{}", tag, object.object),
        };
        return format!("{}{}", markup.error_marker(error.code()), markup.escape(&written));
    }

    let noun = locale.type_label(&object.object_type);
    let link = match (&object.schema, &endpoint.url) {
        (_, Some(url)) => markup.external_link(url, &object.object),
        (Some(schema), None) => markup.internal_link(
            &object_anchor(schema, &object.object_type, &object.object),
            &format!("{}.{}", schema, object.object),
        ),
        (None, None) => markup.escape(&object.object),
    };
    format!("{} {}", noun, link)
}
