//! CSS selector construction for the link extractor.

use log::error;
use scraper::Selector;

/// Matches no element; used when a selector literal fails to parse.
const MATCH_NOTHING: &str = ":not(*)";

/// Parses a selector literal, degrading to one that matches nothing.
///
/// A broken literal would only make link extraction come up empty, so it is
/// logged instead of taking the process down. `purpose` names the lookup in
/// the log line.
pub fn selector_or_empty(css: &str, purpose: &str) -> Selector {
    match Selector::parse(css) {
        Ok(selector) => selector,
        Err(e) => {
            error!("Invalid CSS selector '{css}' for {purpose}: {e}");
            Selector::parse(MATCH_NOTHING)
                .unwrap_or_else(|e| panic!("Invalid fallback selector: {e}"))
        }
    }
}
