//! Best-effort field extraction from raw frames.
//!
//! The correlation engine only ever needs a handful of top-level fields from
//! an inbound frame (`id`, `error`, `method`, and a few known reply fields),
//! so it uses a narrow textual scan instead of assuming a full JSON decoder.
//! See [`extract_field`] for the exact contract and documented limitations.
//! Anything beyond those fields should go through `serde_json` (see
//! [`Reply::json`](crate::protocol::Reply::json)).

// ============================================================================
// extract_field
// ============================================================================

/// Extracts the value of a top-level `field` from a raw JSON-shaped frame.
///
/// Handles three value shapes:
///
/// - **Quoted string**: returns the slice between the quotes.
/// - **Object**: returns the full `{...}` slice, brace-matched with a depth
///   counter so nested objects are included.
/// - **Bare token** (number, boolean, `null`): returns the slice terminated
///   at the next of `,`, `}`, `]`, trimmed.
///
/// Returns `None` when the field is absent or the frame is truncated.
///
/// # Limitations
///
/// This is deliberately not a JSON parser:
///
/// - String values containing escaped quotes (`\"`) are cut at the first
///   quote character.
/// - The scan matches `"field":` anywhere in the text, so a value that
///   happens to contain that byte sequence can shadow the real field.
/// - Array values are not brace-matched and come back truncated at the
///   first `,`.
/// - Brace characters inside string values confuse the depth counter.
///
/// These cases do not occur for the fields the engine extracts (`id`,
/// `error`, `method`, `result`, `targetId`, `sessionId` and friends on CDP
/// reply frames).
#[must_use]
pub fn extract_field<'a>(raw: &'a str, field: &str) -> Option<&'a str> {
    let pattern = format!("\"{field}\":");
    let start = raw.find(&pattern)? + pattern.len();

    let rest = raw[start..].trim_start();
    if rest.is_empty() {
        return None;
    }

    match rest.as_bytes()[0] {
        b'"' => {
            let inner = &rest[1..];
            let end = inner.find('"')?;
            Some(&inner[..end])
        }
        b'{' => {
            let mut depth = 0usize;
            for (i, b) in rest.bytes().enumerate() {
                match b {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(&rest[..=i]);
                        }
                    }
                    _ => {}
                }
            }
            // Unbalanced braces: truncated frame.
            None
        }
        _ => {
            let end = rest
                .find([',', '}', ']'])
                .unwrap_or(rest.len());
            let token = rest[..end].trim();
            if token.is_empty() { None } else { Some(token) }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
