//! Emoji encoding for charset-lossy storage
//!
//! Two invertible codecs protect characters outside what the datastore keeps:
//!
//! - entity form: non-ASCII characters become `&#xHEX;` and `&` becomes `&amp;`
//! - curly form: characters outside the Basic Multilingual Plane become
//!   `\u{HEX}` and `\` becomes `\\`
//!
//! For both, `decode(encode(x)) == x` for every string. [`decode_content`] is
//! the lenient display-side decoder for content that may carry either form.

use std::fmt::Write;
use std::sync::LazyLock;

use regex_lite::Regex;

static CURLY_ESCAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\\u\{([0-9a-fA-F]{1,6})\}").ok());

/// Encode every non-ASCII character as a hexadecimal HTML entity
pub fn encode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            c if c.is_ascii() => out.push(c),
            c => {
                let _ = write!(out, "&#x{:X};", u32::from(c));
            }
        }
    }
    out
}

/// Decode HTML entities (named, decimal and hexadecimal)
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Encode characters above U+FFFF as `\u{HEX}`
pub fn encode_curly(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            c if u32::from(c) > 0xFFFF => {
                let _ = write!(out, "\\u{{{:X}}}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`encode_curly`]. Malformed escapes are kept as written.
pub fn decode_curly(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("\\\\") {
            out.push('\\');
            rest = after;
        } else if let Some((ch, consumed)) = parse_curly_escape(tail) {
            out.push(ch);
            rest = &tail[consumed..];
        } else {
            out.push('\\');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Parse a leading `\u{HEX}`, returning the character and bytes consumed
fn parse_curly_escape(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix("\\u{")?;
    let end = body.find('}')?;
    let hex = &body[..end];
    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    let ch = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
    Some((ch, 3 + end + 1))
}

/// Decode whatever emoji encoding the content carries, for display.
///
/// Curly escapes are expanded first, then HTML entities.
pub fn decode_content(text: &str) -> String {
    let expanded = match CURLY_ESCAPE.as_ref() {
        Some(re) if text.contains("\\u{") => re
            .replace_all(text, |caps: &regex_lite::Captures<'_>| {
                u32::from_str_radix(&caps[1], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map_or_else(|| caps[0].to_string(), String::from)
            })
            .into_owned(),
        _ => text.to_string(),
    };
    decode_entities(&expanded)
}
