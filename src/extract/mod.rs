//! Structured field extraction.
//!
//! Normalized imprint text is sent to the language model with the schema
//! prompt. The reply is decoded strictly first (the whole reply is a JSON
//! object) and leniently second (the first JSON object embedded in prose),
//! then post-processed into the flat `ImprintFields` record.

mod decode;
mod schema;

use std::sync::Arc;

use log::{debug, warn};

use crate::error_handling::ExtractionError;
use crate::llm::prompts::field_extraction_prompt;
use crate::llm::LanguageModel;
use crate::models::ImprintFields;

use decode::{decode_reply, DecodedReply};

/// Extracts imprint fields from page text with a language model.
#[derive(Clone)]
pub struct FieldExtractor {
    model: Arc<dyn LanguageModel>,
}

impl FieldExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Extracts the eleven imprint fields from normalized page text.
    ///
    /// A reply in which every field is empty is still returned as `Ok`.
    ///
    /// # Errors
    ///
    /// - `ExtractionError::NoContent` if `text` is blank (no model call is made)
    /// - `ExtractionError::Service` if the model call fails
    /// - `ExtractionError::Malformed` if no JSON object can be decoded
    pub async fn extract_fields(&self, text: &str) -> Result<ImprintFields, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::NoContent);
        }

        let reply = self.model.generate(&field_extraction_prompt(text)).await?;
        let schema = match decode_reply(&reply)? {
            DecodedReply::Strict(schema) => schema,
            DecodedReply::Lenient(schema) => {
                debug!("Recovered JSON object from surrounding text in model reply");
                schema
            }
        };

        let fields = schema.into_fields();
        if fields.is_empty() {
            warn!("Model reply decoded but contained no imprint fields");
        }
        Ok(fields)
    }
}
