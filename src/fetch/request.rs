//! HTTP request building.
//!
//! Every page request carries the same realistic browser headers. Imprint
//! pages are mostly German-language, so German is listed first in
//! `Accept-Language`.

/// Realistic browser request headers.
///
/// Some hosting providers serve an empty shell or a 403 to clients that do not
/// look like a browser, which would hide the imprint link.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    pub(crate) const ACCEPT: &'static str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
    pub(crate) const ACCEPT_LANGUAGE: &'static str = "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7";

    /// Applies the standard request headers to a `reqwest::RequestBuilder`.
    pub(crate) fn apply_to_request_builder(
        builder: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        builder
            .header(reqwest::header::ACCEPT, Self::ACCEPT)
            .header(reqwest::header::ACCEPT_LANGUAGE, Self::ACCEPT_LANGUAGE)
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-dest"),
                "document",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-mode"),
                "navigate",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-site"),
                "none",
            )
            .header(reqwest::header::UPGRADE_INSECURE_REQUESTS, "1")
            .header(reqwest::header::CACHE_CONTROL, "max-age=0")
    }
}
