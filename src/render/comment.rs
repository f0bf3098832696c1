//! Annotated comment rendering

use tracing::debug;

use super::{object_anchor, Locale, Markup};
use crate::annotation::{Keyword, KeywordKind, ObjectType, ReferenceArgs, ResolvedTarget};

/// Piece of a comment: literal prose or one keyword with its raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Keyword { keyword: &'a Keyword, raw: &'a str },
}

impl Segment<'_> {
    /// Text of the comment this segment covers
    pub fn raw(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Keyword { raw, .. } => raw,
        }
    }
}

/// Split a comment at its keyword spans.
///
/// Keywords are expected in position order. Concatenating the raw text of
/// the returned segments reproduces the comment.
pub fn split_comment<'a>(comment: &'a str, keywords: &'a [Keyword]) -> Vec<Segment<'a>> {
    let mut segments = Vec::with_capacity(keywords.len() * 2 + 1);
    let mut cursor = 0;

    for keyword in keywords {
        let span = keyword.span();
        if span.start < cursor {
            debug!("Skipping overlapping keyword {} at {}", keyword.name, span.start);
            continue;
        }
        let (Some(before), Some(raw)) = (comment.get(cursor..span.start), comment.get(span.clone()))
        else {
            debug!("Keyword {} at {} is outside the comment", keyword.name, span.start);
            continue;
        };
        if !before.is_empty() {
            segments.push(Segment::Text(before));
        }
        segments.push(Segment::Keyword { keyword, raw });
        cursor = span.end;
    }

    if cursor < comment.len() {
        segments.push(Segment::Text(&comment[cursor..]));
    }
    segments
}

/// Render a comment with its resolved keywords spliced in as links,
/// parameter labels or error markers. `None` when there is no comment.
pub fn render_comment(
    comment: Option<&str>,
    keywords: &[Keyword],
    markup: &dyn Markup,
    locale: Locale,
) -> Option<String> {
    let comment = comment?;
    let mut out = String::with_capacity(comment.len());

    // Keyword spans index the full comment, so segments are split there and
    // the passthrough prefix is cut from the leading prose afterwards.
    let prefix_len = markup
        .passthrough(comment)
        .map(|body| comment.len() - body.len());
    let mut offset = 0;

    for segment in split_comment(comment, keywords) {
        let start = offset;
        offset += segment.raw().len();
        match (segment, prefix_len) {
            (Segment::Text(text), Some(prefix_len)) => {
                let skip = prefix_len.saturating_sub(start).min(text.len());
                out.push_str(text.get(skip..).unwrap_or_default());
            }
            (Segment::Text(text), None) => out.push_str(&markup.escape(text)),
            (Segment::Keyword { keyword, raw }, _) => {
                out.push_str(&render_keyword(keyword, raw, markup, locale))
            }
        }
    }
    Some(out)
}

fn render_keyword(keyword: &Keyword, raw: &str, markup: &dyn Markup, locale: Locale) -> String {
    if let Some(error) = keyword.error {
        return format!("{}{}", markup.error_marker(error.code()), markup.escape(raw));
    }

    match keyword.kind {
        KeywordKind::Depends | KeywordKind::Affects => {
            match (&keyword.target, keyword.reference()) {
                (Some(target), Some(args)) => {
                    let depends = keyword.kind == KeywordKind::Depends;
                    let phrase = locale.reference_phrase(depends, &target.object_type());
                    format!("{} {}", phrase, target_link(target, args, markup))
                }
                // not resolved yet
                _ => markup.escape(raw),
            }
        }
        KeywordKind::Param => match keyword.param() {
            Some(args) => format!(
                "{} {}",
                locale.parameter_label(),
                markup.bold(&markup.escape(&args.name.value))
            ),
            None => markup.escape(raw),
        },
        KeywordKind::Unknown => markup.escape(raw),
    }
}

fn target_link(target: &ResolvedTarget, args: &ReferenceArgs, markup: &dyn Markup) -> String {
    match target {
        ResolvedTarget::Relation { kind, schema, name } => markup.internal_link(
            &object_anchor(schema, &ObjectType::from(*kind), name),
            &display_name(args),
        ),
        ResolvedTarget::Function { schema, signature } => markup.internal_link(
            &object_anchor(schema, &ObjectType::Function, signature),
            &display_name(args),
        ),
        ResolvedTarget::Layer(entry) | ResolvedTarget::Service(entry) => {
            markup.external_link(&entry.url, &entry.name)
        }
    }
}

/// `schema.object` as written in the annotation, lowercased
fn display_name(args: &ReferenceArgs) -> String {
    match &args.schema {
        Some(schema) => format!("{}.{}", schema.value, args.object.value).to_lowercase(),
        None => args.object.value.to_lowercase(),
    }
}
