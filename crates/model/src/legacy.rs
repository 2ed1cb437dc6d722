//! Decoder for error tokens embedded in free-form exception text.
//!
//! Services that predate typed result envelopes report business failures by
//! throwing with a message such as `"call failed [_1042:account locked_]"`. The
//! token between `[_` and `_]` carries a code and a description separated by
//! `:`.

/// Opens a legacy token.
pub const START_MARKER: &str = "[_";

/// Closes a legacy token.
pub const END_MARKER: &str = "_]";

/// Separates code and description fragments inside a token.
pub const SEPARATOR: char = ':';

/// A token found in an exception message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyToken {
    /// Token with a code fragment followed by one or more description fragments.
    Coded { code: String, description: String },
    /// Token with a single fragment. No code can be told apart from the text,
    /// so the whole fragment is kept as a description.
    Uncoded(String),
}

/// Extracts the first legacy token from `message`.
///
/// Returns `None` when the message is blank or either marker is missing.
/// Trailing empty fragments are ignored, so `"[_1042:_]"` is a single fragment.
/// An uncoded token keeps the token text exactly as it appeared, separators
/// included. Codes are not validated here.
pub fn decode(message: &str) -> Option<LegacyToken> {
    if message.trim().is_empty() {
        return None;
    }

    let begin = message.find(START_MARKER)? + START_MARKER.len();
    let end = begin + message[begin..].find(END_MARKER)?;
    let body = &message[begin..end];

    let mut fragments: Vec<&str> = body.split(SEPARATOR).collect();
    while fragments.len() > 1 && fragments.last().is_some_and(|f| f.is_empty()) {
        fragments.pop();
    }

    match fragments.as_slice() {
        [code, rest @ ..] if !rest.is_empty() => Some(LegacyToken::Coded {
            code: (*code).to_string(),
            description: rest.concat(),
        }),
        _ => Some(LegacyToken::Uncoded(body.to_string())),
    }
}
