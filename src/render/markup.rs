//! Output formatters
//!
//! The renderers only decide *what* to emit; a [`Markup`] decides how text
//! is escaped and how bold text, error markers, links and lists look in the
//! target format.

use std::sync::LazyLock;

use quick_xml::escape::escape;
use regex::Regex;

use crate::annotation::ObjectType;

/// Target-format primitives used by the renderers
pub trait Markup {
    /// Escape literal text
    fn escape(&self, text: &str) -> String;

    /// Emphasise already-escaped text
    fn bold(&self, text: &str) -> String;

    /// Inline marker placed before a broken keyword
    fn error_marker(&self, code: &str) -> String;

    /// Link to an anchor in the same document; `label` is unescaped
    fn internal_link(&self, anchor: &str, label: &str) -> String;

    /// Link to an external URL; `label` is unescaped
    fn external_link(&self, url: &str, label: &str) -> String;

    /// List of already-rendered items
    fn list(&self, items: &[String]) -> String;

    /// Body of a comment that is already written in the target format, or
    /// `None` when its prose must be escaped. Decided once per comment.
    fn passthrough<'a>(&self, _comment: &'a str) -> Option<&'a str> {
        None
    }
}

/// HTML fragments
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl Markup for HtmlMarkup {
    fn escape(&self, text: &str) -> String {
        escape(text).replace('\n', "<br>")
    }

    fn bold(&self, text: &str) -> String {
        format!("<b>{}</b>", text)
    }

    fn error_marker(&self, code: &str) -> String {
        format!("<b><font color=\"red\">[ERROR: {}] </font></b>", code)
    }

    fn internal_link(&self, anchor: &str, label: &str) -> String {
        format!("<a href=\"#{}\">{}</a>", escape(anchor), self.escape(label))
    }

    fn external_link(&self, url: &str, label: &str) -> String {
        format!("<a href=\"{}\">{}</a>", escape(url), self.escape(label))
    }

    fn list(&self, items: &[String]) -> String {
        let mut out = String::from("<ul>");
        for item in items {
            out.push_str("<li>");
            out.push_str(item);
            out.push_str("</li>");
        }
        out.push_str("</ul>");
        out
    }
}

/// DocBook fragments. A comment starting with `@DOCBOOK` is already markup
/// and its prose is passed through without the prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocBookMarkup;

const DOCBOOK_PASSTHROUGH: &str = "@DOCBOOK";

impl Markup for DocBookMarkup {
    fn escape(&self, text: &str) -> String {
        escape(text).into_owned()
    }

    fn bold(&self, text: &str) -> String {
        format!("<emphasis role=\"bold\">{}</emphasis>", text)
    }

    fn error_marker(&self, code: &str) -> String {
        format!("<emphasis role=\"bold\">[ERROR: {}] </emphasis>", code)
    }

    fn internal_link(&self, anchor: &str, label: &str) -> String {
        format!("<link linkend=\"{}\">{}</link>", escape(anchor), self.escape(label))
    }

    fn external_link(&self, url: &str, label: &str) -> String {
        format!("<ulink url=\"{}\">{}</ulink>", escape(url), self.escape(label))
    }

    fn list(&self, items: &[String]) -> String {
        let mut out = String::from("<itemizedlist>");
        for item in items {
            out.push_str("<listitem><para>");
            out.push_str(item);
            out.push_str("</para></listitem>");
        }
        out.push_str("</itemizedlist>");
        out
    }

    fn passthrough<'a>(&self, comment: &'a str) -> Option<&'a str> {
        comment.strip_prefix(DOCBOOK_PASSTHROUGH)
    }
}

/// Plain text, nothing escaped
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkup;

impl Markup for PlainMarkup {
    fn escape(&self, text: &str) -> String {
        text.to_string()
    }

    fn bold(&self, text: &str) -> String {
        text.to_string()
    }

    fn error_marker(&self, code: &str) -> String {
        format!("[ERROR: {}] ", code)
    }

    fn internal_link(&self, _anchor: &str, label: &str) -> String {
        label.to_string()
    }

    fn external_link(&self, url: &str, label: &str) -> String {
        format!("{} <{}>", label, url)
    }

    fn list(&self, items: &[String]) -> String {
        items
            .iter()
            .map(|item| format!("- {}", item.replace('\n', "\n  ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

static ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\]").expect("Invalid array regex"));
static UNSAFE_ID_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[ "',)(_-]+"#).expect("Invalid id regex"));

/// SGML-safe id: `[]` becomes `ARRAY-`, runs of spaces, quotes, commas,
/// parentheses, underscores and hyphens collapse to one `-`, and a trailing
/// `-` is dropped.
pub fn sgml_safe_id(text: &str) -> String {
    let id = ARRAY_RE.replace_all(text, "ARRAY-");
    let id = UNSAFE_ID_CHARS_RE.replace_all(&id, "-");
    id.strip_suffix('-').unwrap_or(&id).to_string()
}

/// Anchor of a documented object: `schema.type.object`, SGML-safe
pub fn object_anchor(schema: &str, object_type: &ObjectType, object: &str) -> String {
    sgml_safe_id(&format!(
        "{}.{}.{}",
        schema,
        object_type.name().to_lowercase(),
        object
    ))
}
