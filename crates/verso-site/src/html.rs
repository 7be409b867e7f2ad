//! HTML text helpers.

use std::borrow::Cow;

fn entity(byte: u8) -> Option<&'static str> {
    Some(match byte {
        b'&' => "&amp;",
        b'<' => "&lt;",
        b'>' => "&gt;",
        b'"' => "&quot;",
        b'\'' => "&#39;",
        _ => return None,
    })
}

/// Escape markup characters so `text` is safe in element content and in
/// quoted attribute values. Borrows when nothing needs escaping.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    let Some(first) = text.bytes().position(|b| entity(b).is_some()) else {
        return Cow::Borrowed(text);
    };

    let mut escaped = String::with_capacity(text.len() + 16);
    escaped.push_str(&text[..first]);
    let mut copied = first;
    for (i, byte) in text.bytes().enumerate().skip(first) {
        if let Some(replacement) = entity(byte) {
            // Markup characters are ASCII, so `i` is always a char boundary.
            escaped.push_str(&text[copied..i]);
            escaped.push_str(replacement);
            copied = i + 1;
        }
    }
    escaped.push_str(&text[copied..]);
    Cow::Owned(escaped)
}
