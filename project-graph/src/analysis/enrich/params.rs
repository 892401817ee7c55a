//! Parameter-list parsing for callable detail strings.
//!
//! A Dart parameter list has three segments: required positional, `[...]`
//! optional positional and `{...}` named. Each segment is parsed by the same
//! slot parser, which tries these shapes in order:
//!
//! 1. `[required] this.field` → `self_field:<field>` placeholder
//! 2. `<Ret> Function(...) name`
//! 3. `<type> name`
//! 4. a lone token, read as a type or as a `dynamic` name

use crate::model::symbol::{ParsedParameter, SELF_FIELD_PREFIX};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

static PARAMS_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\((.*)\)").expect("valid params regex"));

static THIS_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(required\s+)?this\.([\w$]+)\s*(?:=.*?)?(?:,|$)").expect("valid this regex")
});

static FUNCTION_TYPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(required|covariant)\s+)?((?:[\w$<>?,.\s\[\]]+\s+)?Function\s*\((?:[^)]*?\))?\s*\??)\s+([\w$]+)\s*(?:=.*?)?(?:,|$)",
    )
    .expect("valid function-typed regex")
});

static TYPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(required|covariant)\s+)?((?:[\w$.<>?\[\]\s(),']+?|Function\s*\((?:[^)]*\))?\s*\??))\s+([\w$]+)\s*(?:=.*?)?(?:,|$)",
    )
    .expect("valid typed-param regex")
});

static TYPE_OR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*((?:[\w$]+(?:<[\w$,\s<>?]+(?:<[\w$,\s<>?]+>)?\??>)?\??)|(?:(?:[\w$<>?,.\s\[\]]+\s+)?Function\s*\((?:[^)]*?\))?\s*\??)|(?:[\w$.]+))\s*(?:,|$)",
    )
    .expect("valid type-or-name regex")
});

static LOOKS_LIKE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[<>?()]|Function|^void$|^dynamic$|^Never$|^Null$|^Object$|^bool$|^int$|^double$|^num$|^String$")
        .expect("valid type-token regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Segments of a parameter list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParamSegments {
    pub required: String,
    pub optional: String,
    pub named: String,
}

/// Parse the parameter list out of a callable's detail string.
///
/// Returns `None` when the detail has no parenthesized section at all.
pub fn parse_parameters(detail: &str) -> Option<Vec<ParsedParameter>> {
    let content = PARAMS_CONTENT.captures(detail)?.get(1)?.as_str().trim();
    let segments = split_segments(content);

    let mut out = Vec::new();
    out.extend(parse_slots(&segments.required, SlotKind::Required));
    out.extend(parse_slots(&segments.optional, SlotKind::OptionalPositional));
    out.extend(parse_slots(&segments.named, SlotKind::Named));
    Some(out)
}

/// Split `a, [b], {c}` style content into its three segments.
pub fn split_segments(content: &str) -> ParamSegments {
    let mut required = content.to_string();
    let mut named = String::new();
    let mut optional = String::new();

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            let before = &content[..start];
            let tail_from = match (before.rfind('['), before.rfind('{')) {
                (Some(b), Some(c)) if b > c => b,
                (Some(b), None) => b,
                _ => 0,
            };
            if !before[tail_from..].contains('}') {
                named = content[start + 1..end].trim().to_string();
                required = before.trim().to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (required.find('['), required.rfind(']')) {
        if end > start && !required[start..].contains('{') {
            optional = required[start + 1..end].trim().to_string();
            required = required[..start].trim().to_string();
        }
    }

    if let Some(stripped) = required.strip_suffix(',') {
        required = stripped.trim().to_string();
    }

    ParamSegments {
        required,
        optional,
        named,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Required,
    OptionalPositional,
    Named,
}

fn parse_slots(segment: &str, kind: SlotKind) -> Vec<ParsedParameter> {
    let named = kind == SlotKind::Named;
    let optional = kind == SlotKind::OptionalPositional;
    let mut remaining = segment.trim();
    let mut params = Vec::new();

    while !remaining.is_empty() {
        let (param, consumed) = if let Some(c) = THIS_FIELD.captures(remaining) {
            let field = c[2].trim();
            let p = ParsedParameter {
                ty: format!("{SELF_FIELD_PREFIX}{field}"),
                name: Some(field.to_string()),
                is_named: named,
                is_required: named && c.get(1).is_some(),
                is_optional_positional: false,
                type_ref: None,
            };
            (p, matched_len(&c))
        } else if let Some(c) = FUNCTION_TYPED
            .captures(remaining)
            .or_else(|| TYPED.captures(remaining))
            .filter(|c| !has_top_level_comma(&c[2]))
        {
            let p = ParsedParameter {
                ty: normalize_ws(&c[2]),
                name: Some(c[3].trim().to_string()),
                is_named: named,
                is_required: named && c.get(1).is_some_and(|m| m.as_str() == "required"),
                is_optional_positional: optional,
                type_ref: None,
            };
            (p, matched_len(&c))
        } else if let Some(c) = TYPE_OR_NAME.captures(remaining) {
            let token = normalize_ws(&c[1]);
            let is_required = named && remaining.starts_with("required ");
            let p = if named || optional || LOOKS_LIKE_TYPE.is_match(&token) {
                ParsedParameter {
                    ty: token,
                    name: None,
                    is_named: named,
                    is_required,
                    is_optional_positional: optional,
                    type_ref: None,
                }
            } else {
                ParsedParameter {
                    ty: "dynamic".into(),
                    name: Some(token),
                    is_named: named,
                    is_required,
                    is_optional_positional: optional,
                    type_ref: None,
                }
            };
            (p, matched_len(&c))
        } else {
            debug!(remaining, "Stopped parsing parameters: no pattern matched");
            break;
        };

        if consumed == 0 {
            debug!(remaining, "Stopped parsing parameters: empty match");
            break;
        }
        params.push(param);

        let mut consumed = consumed;
        let matched = &remaining[..consumed];
        if !matched.ends_with(',') && remaining[consumed..].starts_with(',') {
            consumed += 1;
        }
        remaining = remaining[consumed..].trim();
    }
    params
}

fn matched_len(c: &Captures<'_>) -> usize {
    c.get(0).map_or(0, |m| m.end())
}

/// A type spanning a comma outside `<>`/`()`/`[]` swallowed the next slot.
fn has_top_level_comma(ty: &str) -> bool {
    let mut depth = 0i32;
    for ch in ty.chars() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth <= 0 => return true,
            _ => {}
        }
    }
    false
}

fn normalize_ws(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}
