//! URL validation and normalization utilities.

use log::warn;
use url::Url;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::PipelineError;

/// Validates and normalizes a raw input URL.
///
/// Trims surrounding whitespace, adds an `https://` prefix if no scheme is
/// present, then checks that the result parses, has a host, and uses the
/// http/https scheme. URLs longer than `MAX_URL_LENGTH` are rejected.
///
/// # Errors
///
/// Returns `PipelineError::InvalidUrl` describing why the input was rejected.
/// A blank input yields `"Invalid URL: empty"`.
pub fn validate_and_normalize_url(raw: &str) -> Result<String, PipelineError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(PipelineError::InvalidUrl("empty".to_string()));
    }

    // Check URL length before normalization
    if url.chars().count() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {})",
            url.chars().count(),
            MAX_URL_LENGTH
        );
        return Err(PipelineError::InvalidUrl(format!(
            "longer than {MAX_URL_LENGTH} characters"
        )));
    }

    let lower = url.to_ascii_lowercase();
    let normalized = if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else if url.contains("://") {
        warn!("Skipping unsupported scheme for URL: {url}");
        return Err(PipelineError::InvalidUrl(format!(
            "unsupported scheme: {url}"
        )));
    } else {
        format!("https://{url}")
    };

    // The https:// prefix could push it over the limit
    if normalized.chars().count() > MAX_URL_LENGTH {
        return Err(PipelineError::InvalidUrl(format!(
            "longer than {MAX_URL_LENGTH} characters"
        )));
    }

    match Url::parse(&normalized) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => {
                Ok(normalized)
            }
            "http" | "https" => Err(PipelineError::InvalidUrl(format!("missing host: {url}"))),
            _ => {
                warn!("Skipping unsupported scheme for URL: {url}");
                Err(PipelineError::InvalidUrl(format!(
                    "unsupported scheme: {url}"
                )))
            }
        },
        Err(e) => {
            warn!("Skipping invalid URL: {url}");
            Err(PipelineError::InvalidUrl(format!("{url} ({e})")))
        }
    }
}

/// Returns `scheme://host[:port]` for a URL, or `None` if it does not parse.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str()?;
    Some(parsed.origin().ascii_serialization())
}

/// Returns true when both URLs point at the same site.
///
/// Hosts are compared case-insensitively after stripping a leading `www.`.
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => site_host(ha) == site_host(hb),
        _ => false,
    }
}

fn site_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_and_normalize_url_adds_https() {
        let result = validate_and_normalize_url("example.com");
        assert_eq!(result, Ok("https://example.com".to_string()));
    }

    #[test]
    fn test_validate_and_normalize_url_trims_whitespace() {
        let result = validate_and_normalize_url("  example.de/kontakt \n");
        assert_eq!(result, Ok("https://example.de/kontakt".to_string()));
    }

    #[test]
    fn test_validate_and_normalize_url_preserves_http() {
        let result = validate_and_normalize_url("http://example.com");
        assert_eq!(result, Ok("http://example.com".to_string()));
    }

    #[test]
    fn test_validate_and_normalize_url_with_port_and_path() {
        assert_eq!(
            validate_and_normalize_url("example.com:8080"),
            Ok("https://example.com:8080".to_string())
        );
        assert_eq!(
            validate_and_normalize_url("example.com/path?query=value"),
            Ok("https://example.com/path?query=value".to_string())
        );
    }

    #[test]
    fn test_validate_and_normalize_url_empty() {
        let err = validate_and_normalize_url("   ").unwrap_err();
        assert_eq!(err.to_string(), "Invalid URL: empty");
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_unsupported_scheme() {
        let err = validate_and_normalize_url("ftp://example.com").unwrap_err();
        assert!(err.to_string().starts_with("Invalid URL"));
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_invalid_url() {
        let err = validate_and_normalize_url("not a valid url!!!").unwrap_err();
        assert!(err.to_string().starts_with("Invalid URL"));
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_too_long_url() {
        let long_url = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(validate_and_normalize_url(&long_url).is_err());
    }

    #[test]
    fn test_validate_and_normalize_url_accepts_url_at_limit() {
        let prefix = "https://example.com/";
        let url = format!("{prefix}{}", "a".repeat(MAX_URL_LENGTH - prefix.len()));
        assert_eq!(validate_and_normalize_url(&url), Ok(url.clone()));
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://www.example.de/a/b?c=d"),
            Some("https://www.example.de".to_string())
        );
        assert_eq!(
            origin_of("http://127.0.0.1:8080/x"),
            Some("http://127.0.0.1:8080".to_string())
        );
        assert_eq!(origin_of("not a url"), None);
    }

    #[test]
    fn test_same_site_ignores_www() {
        let a = Url::parse("https://www.example.de/").unwrap();
        let b = Url::parse("https://example.de/impressum").unwrap();
        let c = Url::parse("https://other.de/impressum").unwrap();
        assert!(same_site(&a, &b));
        assert!(!same_site(&a, &c));
    }
}
