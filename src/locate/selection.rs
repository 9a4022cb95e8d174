//! Matching a model's link-selection reply against the candidate list.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::llm::prompts::NO_SELECTION;
use crate::models::LinkCandidate;

static URL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s'"<>()\[\]|`]+"#)
        .unwrap_or_else(|e| panic!("Invalid URL token regex: {e}"))
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '*', '"', '\'', '`'];

/// Outcome of reading a link-selection reply.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Selection<'a> {
    /// The model declined or answered with nothing usable.
    Nothing,
    /// The reply names a URL that is not among the candidates.
    Unknown(String),
    Chosen(&'a LinkCandidate),
}

/// Reduces a reply to its first URL-like token and finds that candidate.
///
/// Absolute URLs are compared first (ignoring a trailing slash), then paths.
/// A bare list index (`"3"`) is also accepted.
pub(crate) fn match_selection<'a>(reply: &str, candidates: &'a [LinkCandidate]) -> Selection<'a> {
    let reply = reply.trim();
    let first_word = reply
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(TRAILING_PUNCTUATION);
    if first_word.is_empty() || first_word.eq_ignore_ascii_case(NO_SELECTION) {
        return Selection::Nothing;
    }

    if let Ok(index) = first_word.parse::<usize>() {
        return candidates
            .get(index)
            .map_or_else(|| Selection::Unknown(first_word.to_string()), Selection::Chosen);
    }

    let token = match URL_TOKEN_RE.find(reply) {
        Some(m) => m.as_str(),
        None => match reply.split_whitespace().find(|w| w.starts_with('/')) {
            Some(path) => path,
            None => return Selection::Nothing,
        },
    }
    .trim_end_matches(TRAILING_PUNCTUATION);

    let wanted = token.trim_end_matches('/');
    if let Some(candidate) = candidates
        .iter()
        .find(|c| c.href.trim_end_matches('/') == wanted)
    {
        return Selection::Chosen(candidate);
    }

    let wanted_path = path_of(token);
    if let Some(candidate) = wanted_path.as_deref().and_then(|wanted| {
        candidates
            .iter()
            .find(|c| path_of(&c.href).as_deref() == Some(wanted))
    }) {
        return Selection::Chosen(candidate);
    }

    Selection::Unknown(token.to_string())
}

/// Path (and query) without a trailing slash; `None` for the site root.
fn path_of(url_or_path: &str) -> Option<String> {
    let tail = match Url::parse(url_or_path) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) if url_or_path.starts_with('/') => {
            url_or_path.split('#').next().unwrap_or_default().to_string()
        }
        Err(_) => return None,
    };
    let tail = tail.trim_end_matches('/');
    (!tail.is_empty()).then(|| tail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<LinkCandidate> {
        vec![
            LinkCandidate::new("https://www.a.de/kontakt", "Kontakt"),
            LinkCandidate::new("https://www.a.de/rechtliches/", "Rechtliches"),
            LinkCandidate::new("https://www.a.de/info/anbieter", "Anbieter"),
        ]
    }

    #[test]
    fn test_exact_url() {
        let links = candidates();
        assert_eq!(
            match_selection("https://www.a.de/info/anbieter", &links),
            Selection::Chosen(&links[2])
        );
    }

    #[test]
    fn test_url_inside_prose_with_punctuation() {
        let links = candidates();
        assert_eq!(
            match_selection("The imprint is at https://www.a.de/rechtliches.", &links),
            Selection::Chosen(&links[1])
        );
    }

    #[test]
    fn test_path_match_across_hosts() {
        let links = candidates();
        assert_eq!(
            match_selection("https://a.de/info/anbieter/", &links),
            Selection::Chosen(&links[2])
        );
        assert_eq!(
            match_selection("/kontakt", &links),
            Selection::Chosen(&links[0])
        );
    }

    #[test]
    fn test_index_reply() {
        let links = candidates();
        assert_eq!(match_selection("1", &links), Selection::Chosen(&links[1]));
        assert_eq!(
            match_selection("7", &links),
            Selection::Unknown("7".to_string())
        );
    }

    #[test]
    fn test_none_and_empty_replies() {
        let links = candidates();
        assert_eq!(match_selection("NONE", &links), Selection::Nothing);
        assert_eq!(match_selection("none.", &links), Selection::Nothing);
        assert_eq!(match_selection("   ", &links), Selection::Nothing);
        assert_eq!(
            match_selection("I am not sure which one.", &links),
            Selection::Nothing
        );
    }

    #[test]
    fn test_hallucinated_url_is_rejected() {
        let links = candidates();
        assert_eq!(
            match_selection("https://www.a.de/impressum", &links),
            Selection::Unknown("https://www.a.de/impressum".to_string())
        );
    }
}
