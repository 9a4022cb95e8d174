//! Decoding model replies into the extraction schema.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::schema::ImprintSchema;
use crate::error_handling::ExtractionError;
use crate::utils::truncate_chars;

/// Greedy outermost-object match, used when no balanced segment decodes.
static GREEDY_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{.*\}").unwrap_or_else(|e| panic!("Invalid JSON object regex: {e}"))
});

/// How a reply was decoded.
#[derive(Debug)]
pub(crate) enum DecodedReply {
    /// The whole reply (minus code fences) was a JSON object.
    Strict(ImprintSchema),
    /// A JSON object was recovered from surrounding prose.
    Lenient(ImprintSchema),
}

impl DecodedReply {
    pub(crate) fn into_schema(self) -> ImprintSchema {
        match self {
            DecodedReply::Strict(schema) | DecodedReply::Lenient(schema) => schema,
        }
    }
}

/// Decodes a model reply.
///
/// # Errors
///
/// Returns `ExtractionError::Malformed` when neither the whole reply nor any
/// embedded `{…}` segment decodes as a JSON object.
pub(crate) fn decode_reply(reply: &str) -> Result<DecodedReply, ExtractionError> {
    let stripped = strip_code_fences(reply);
    if let Some(schema) = decode_object(stripped) {
        return Ok(DecodedReply::Strict(schema));
    }

    if let Some(schema) = balanced_objects(stripped).find_map(decode_object) {
        return Ok(DecodedReply::Lenient(schema));
    }
    if let Some(schema) = GREEDY_OBJECT_RE
        .find(stripped)
        .and_then(|m| decode_object(m.as_str()))
    {
        return Ok(DecodedReply::Lenient(schema));
    }

    Err(ExtractionError::Malformed(format!(
        "no JSON object in reply: {}",
        truncate_chars(reply.trim(), 100)
    )))
}

fn decode_object(text: &str) -> Option<ImprintSchema> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Removes a surrounding Markdown code fence (```` ```json … ``` ````).
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Yields every balanced `{…}` segment, in order of its opening brace.
///
/// Braces inside JSON string literals are ignored.
fn balanced_objects(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.match_indices('{').filter_map(move |(start, _)| {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (offset, c) in text[start..].char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..start + offset + 1]);
                    }
                }
                _ => {}
            }
        }
        None
    })
}
