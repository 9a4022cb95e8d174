//! Records exchanged between the pipeline stages and with callers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error_handling::PipelineError;
use crate::utils::sanitize::sanitize_and_truncate_error_message;

/// A link found on a fetched page.
///
/// `href` is the resolved absolute URL; candidates keep document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub href: String,
    pub anchor_text: String,
}

impl LinkCandidate {
    pub fn new(href: impl Into<String>, anchor_text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            anchor_text: anchor_text.into(),
        }
    }
}

/// The eleven legal/contact fields extracted from an imprint page.
///
/// Unfound fields are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprintFields {
    pub company_name: String,
    pub managing_directors: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub registration_number: String,
    pub vat_id: String,
}

impl ImprintFields {
    /// Returns true when no field was populated.
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| v.is_empty())
    }

    /// Field values in tabular column order.
    pub fn values(&self) -> [&str; 11] {
        [
            &self.company_name,
            &self.managing_directors,
            &self.street,
            &self.city,
            &self.postal_code,
            &self.country,
            &self.phone,
            &self.email,
            &self.website,
            &self.registration_number,
            &self.vat_id,
        ]
    }
}

/// Diagnostics attached to a result for logging; never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultDiagnostics {
    /// At least one page in this pipeline was fetched with certificate checks disabled.
    pub insecure_tls: bool,
}

/// The per-URL outcome record.
///
/// Serializes to the flat column layout consumed downstream. `imprint_url`
/// and `error_message` are the only nullable fields; `error_message` is
/// present exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprintResult {
    pub timestamp: String,
    pub original_url: String,
    pub imprint_url: Option<String>,
    pub processing_date: String,
    pub processing_time: String,
    #[serde(flatten)]
    pub fields: ImprintFields,
    pub success: bool,
    pub error_message: Option<String>,
    #[serde(skip)]
    pub diagnostics: ResultDiagnostics,
}

impl ImprintResult {
    /// Column order of the tabular representation.
    pub const CSV_HEADERS: [&'static str; 18] = [
        "timestamp",
        "original_url",
        "imprint_url",
        "processing_date",
        "processing_time",
        "company_name",
        "managing_directors",
        "street",
        "city",
        "postal_code",
        "country",
        "phone",
        "email",
        "website",
        "registration_number",
        "vat_id",
        "success",
        "error_message",
    ];

    /// Builds a successful result.
    pub fn success(
        original_url: impl Into<String>,
        imprint_url: impl Into<String>,
        fields: ImprintFields,
    ) -> Self {
        let now = Local::now();
        Self {
            original_url: original_url.into(),
            imprint_url: Some(imprint_url.into()),
            fields,
            success: true,
            error_message: None,
            diagnostics: ResultDiagnostics::default(),
            ..Self::stamped(now)
        }
    }

    /// Builds a failed result; every string field is empty.
    pub fn failure(original_url: impl Into<String>, error: &PipelineError) -> Self {
        let now = Local::now();
        Self {
            original_url: original_url.into(),
            imprint_url: None,
            fields: ImprintFields::default(),
            success: false,
            error_message: Some(sanitize_and_truncate_error_message(&error.to_string())),
            diagnostics: ResultDiagnostics::default(),
            ..Self::stamped(now)
        }
    }

    /// Marks the result as having used the insecure TLS fallback.
    pub fn with_insecure_tls(mut self, insecure_tls: bool) -> Self {
        self.diagnostics.insecure_tls = insecure_tls;
        self
    }

    fn stamped(now: DateTime<Local>) -> Self {
        Self {
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            original_url: String::new(),
            imprint_url: None,
            processing_date: now.format("%Y-%m-%d").to_string(),
            processing_time: now.format("%H:%M:%S").to_string(),
            fields: ImprintFields::default(),
            success: false,
            error_message: None,
            diagnostics: ResultDiagnostics::default(),
        }
    }

    /// Row values in `CSV_HEADERS` order. Null fields become empty cells.
    pub fn csv_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(Self::CSV_HEADERS.len());
        record.push(self.timestamp.clone());
        record.push(self.original_url.clone());
        record.push(self.imprint_url.clone().unwrap_or_default());
        record.push(self.processing_date.clone());
        record.push(self.processing_time.clone());
        record.extend(self.fields.values().iter().map(|v| v.to_string()));
        record.push(self.success.to_string());
        record.push(self.error_message.clone().unwrap_or_default());
        record
    }
}

/// A batch request as received from the request wrapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Aggregated outcome of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    pub total_urls: usize,
    pub successful_extractions: usize,
    pub failed_extractions: usize,
    pub success_rate_percent: f64,
    pub processing_time_seconds: f64,
    pub results: Vec<ImprintResult>,
}

impl BatchResult {
    /// Aggregates ordered results into a batch outcome.
    ///
    /// Counts are always derived from `results`, so
    /// `successful_extractions + failed_extractions == total_urls` holds.
    pub fn from_results(results: Vec<ImprintResult>, elapsed_seconds: f64) -> Self {
        let total_urls = results.len();
        let successful_extractions = results.iter().filter(|r| r.success).count();
        let failed_extractions = total_urls - successful_extractions;
        Self {
            success: true,
            total_urls,
            successful_extractions,
            failed_extractions,
            success_rate_percent: success_rate(successful_extractions, total_urls),
            processing_time_seconds: round_one_decimal(elapsed_seconds),
            results,
        }
    }
}

/// Percentage of successes rounded to one decimal; 0 for an empty batch.
pub fn success_rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_one_decimal(successful as f64 * 100.0 / total as f64)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
