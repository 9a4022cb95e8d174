//! Prompt templates.

use std::fmt::Write;

use crate::config::{MAX_PROMPT_CONTENT_CHARS, MAX_PROMPT_LINKS};
use crate::models::LinkCandidate;
use crate::utils::truncate_at_whitespace;

/// The token the model replies with when no link qualifies.
pub const NO_SELECTION: &str = "NONE";

/// Opening instruction of the link-selection prompt.
pub const LINK_SELECTION_TASK: &str =
    "Identify the link that leads to the imprint page of this company website.";

/// Opening instruction of the field-extraction prompt.
pub const FIELD_EXTRACTION_TASK: &str =
    "Extract the legal and contact information of the site operator from the imprint page below.";

/// Builds the link-selection prompt for up to `MAX_PROMPT_LINKS` candidates.
pub fn link_selection_prompt(candidates: &[LinkCandidate]) -> String {
    let mut listing = String::new();
    for (i, candidate) in candidates.iter().take(MAX_PROMPT_LINKS).enumerate() {
        let _ = writeln!(
            listing,
            "{i}: {} | text: '{}'",
            candidate.href, candidate.anchor_text
        );
    }

    format!(
        "{LINK_SELECTION_TASK}\n\
         The imprint is called \"Impressum\" in German, and also legal notice, \
         site notice, mentions légales, aviso legal or colofon.\n\
         \n\
         Links:\n\
         {listing}\n\
         Rules:\n\
         - Prefer a link that goes directly to the imprint over a general legal page.\n\
         - If there is no direct imprint link, choose a general legal page (\"Legal\", \
         \"Rechtliches\") that is likely to link to it.\n\
         - Never choose privacy policy, cookie, or terms and conditions pages.\n\
         - Reply with ONLY the full URL of the chosen link, exactly as listed.\n\
         - If no link qualifies, reply with {NO_SELECTION}."
    )
}

/// Builds the field-extraction prompt around normalized page text.
///
/// The text is bounded to `MAX_PROMPT_CONTENT_CHARS` characters, cut at a
/// word boundary.
pub fn field_extraction_prompt(content: &str) -> String {
    let content = truncate_at_whitespace(content, MAX_PROMPT_CONTENT_CHARS);
    format!(
        r#"{FIELD_EXTRACTION_TASK}

Reply with ONLY a JSON object using exactly this structure:

{{
  "company_name": "Company or organization name",
  "managing_directors": ["Director 1", "Director 2"],
  "business_address": {{
    "street": "Street and number",
    "city": "City",
    "postal_code": "Postal code",
    "country": "Country"
  }},
  "phone_numbers": ["Phone 1"],
  "email_addresses": ["email@example.com"],
  "website_url": "https://example.com",
  "registration_details": {{
    "registration_number": "Commercial register number, e.g. HRB 12345"
  }},
  "vat_id": "VAT identification number"
}}

Rules:
- Use null for information that is not on the page. Do not guess.
- If several entities are named, describe the main operator of the site.
- Keep each value short (at most 200 characters).
- Do not add fields.

Page content:
{content}"#
    )
}
