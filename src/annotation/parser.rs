//! Annotation keyword parsing
//!
//! Comments may embed backslash keywords:
//!
//! ```text
//! \depends TABLE: public.orders
//! \affects LAYER:roads
//! \param user_id
//! ```
//!
//! Every backslash token becomes exactly one [`Keyword`], in order of
//! occurrence. Tokens that cannot be parsed still produce a record, carrying
//! an error code instead of arguments.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{ArgSpan, Keyword, KeywordArgs, KeywordError, KeywordKind, ParamArgs, ReferenceArgs};

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\w+").expect("Invalid keyword regex"));

/// `\depends|\affects WS TYPE ":" WS* (SCHEMA ".")? OBJECT`
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\(?:depends|affects)\s+(\w+):\s*(?:(\w+)\.)?(\w+)")
        .expect("Invalid reference regex")
});

/// `\param WS NAME`
static PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\param\s+(\w+)").expect("Invalid param regex"));

/// Parse every keyword in `comment`.
///
/// `allow_param` is true for function comments; elsewhere `\param` is
/// reported as an unexpected keyword. A missing comment yields no keywords.
pub fn parse_comment(comment: Option<&str>, allow_param: bool) -> Vec<Keyword> {
    let Some(comment) = comment else {
        return Vec::new();
    };

    KEYWORD_RE
        .find_iter(comment)
        .map(|m| parse_keyword(comment, m.start(), m.as_str(), allow_param))
        .collect()
}

fn parse_keyword(comment: &str, position: usize, token: &str, allow_param: bool) -> Keyword {
    let kind = KeywordKind::from_token(token);
    let mut keyword = Keyword {
        name: token.to_string(),
        kind,
        position,
        length: token.len(),
        length_with_args: token.len(),
        args: None,
        error: None,
        target: None,
    };

    let rest = &comment[position..];
    let parsed = match kind {
        KeywordKind::Depends | KeywordKind::Affects => parse_reference(rest, position),
        KeywordKind::Param if allow_param => parse_param(rest, position),
        _ => {
            keyword.error = Some(KeywordError::UnexpectedKeyword);
            return keyword;
        }
    };

    match parsed {
        Some((length_with_args, args)) => {
            keyword.length_with_args = length_with_args;
            keyword.args = Some(args);
        }
        None => keyword.error = Some(KeywordError::ArgsParseError),
    }

    keyword
}

fn arg_span(caps: &Captures, group: usize, offset: usize) -> Option<ArgSpan> {
    caps.get(group).map(|m| ArgSpan {
        value: m.as_str().to_string(),
        position: offset + m.start(),
        length: m.len(),
    })
}

fn parse_reference(rest: &str, offset: usize) -> Option<(usize, KeywordArgs)> {
    let caps = REFERENCE_RE.captures(rest)?;
    let args = ReferenceArgs {
        object_type: arg_span(&caps, 1, offset)?,
        schema: arg_span(&caps, 2, offset),
        object: arg_span(&caps, 3, offset)?,
    };
    Some((caps.get(0)?.len(), KeywordArgs::Reference(args)))
}

fn parse_param(rest: &str, offset: usize) -> Option<(usize, KeywordArgs)> {
    let caps = PARAM_RE.captures(rest)?;
    let args = ParamArgs {
        name: arg_span(&caps, 1, offset)?,
    };
    Some((caps.get(0)?.len(), KeywordArgs::Param(args)))
}
