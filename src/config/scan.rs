//! Tolerant field scanner for the config file
//!
//! Recognizes only the three fields the writer emits. This is a substring
//! scan, not a JSON parser: unknown fields and extra whitespace are ignored,
//! and string values are returned in their on-disk (escaped) form.

/// Locate `"enabled"`, then the first `:` after it, then whichever of
/// `true` / `false` appears first in the remaining text.
pub fn parse_enabled(content: &str) -> Option<bool> {
    let after_colon = value_start(content, "enabled")?;
    let rest = &content[after_colon..];

    match (rest.find("true"), rest.find("false")) {
        (Some(t), Some(f)) => Some(t < f),
        (Some(_), None) => Some(true),
        (None, Some(_)) => Some(false),
        (None, None) => None,
    }
}

/// Extract the raw text between the quotes of a string field.
///
/// The closing quote is the next `"` not consumed by a backslash escape, so
/// values written by [`escape`] come back whole. No unescaping is applied.
pub fn parse_string_field(content: &str, field: &str) -> Option<String> {
    let after_colon = value_start(content, field)?;
    let rest = &content[after_colon..];
    let open = rest.find('"')?;
    let body = &rest[open + 1..];

    let mut escaped = false;
    for (idx, ch) in body.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(body[..idx].to_string()),
            _ => {}
        }
    }
    None
}

/// Escape `"` and `\` for the on-disk form
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

/// Byte offset just past the `:` that follows `"<field>"`
fn value_start(content: &str, field: &str) -> Option<usize> {
    let key = format!("\"{}\"", field);
    let key_pos = content.find(&key)?;
    let colon = content[key_pos..].find(':')? + key_pos;
    Some(colon + 1)
}
