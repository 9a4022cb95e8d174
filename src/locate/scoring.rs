//! Keyword scoring of link candidates.

use url::Url;

use crate::config::{EXACT_IMPRINT_ANCHORS, HUB_KEYWORDS, IMPRINT_KEYWORDS, PENALTY_KEYWORDS};
use crate::models::LinkCandidate;

const EXACT_ANCHOR_SCORE: i32 = 10;
const ANCHOR_KEYWORD_SCORE: i32 = 8;
const HREF_KEYWORD_SCORE: i32 = 7;
const PENALTY_SCORE: i32 = -2;

/// How a link relates to the imprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkKind {
    /// Names the imprint directly, with its keyword score.
    Direct(i32),
    /// Names a general legal page that may link to the imprint.
    Staging,
    Unrelated,
}

/// Direct candidates best first, and staging candidates in document order.
#[derive(Debug, Default)]
pub(crate) struct RankedLinks<'a> {
    pub direct: Vec<&'a LinkCandidate>,
    pub staging: Vec<&'a LinkCandidate>,
}

/// Classifies one candidate by its anchor text and URL path.
///
/// Host names are not scored, so `impressum-example.de` does not match.
pub(crate) fn classify(candidate: &LinkCandidate) -> LinkKind {
    let anchor = candidate.anchor_text.trim().to_lowercase();
    let path = href_path(&candidate.href);
    let mentions = |keywords: &[&str]| {
        keywords
            .iter()
            .any(|k| anchor.contains(k) || path.contains(k))
    };

    let mut score = 0;
    if EXACT_IMPRINT_ANCHORS.contains(&anchor.as_str()) {
        score += EXACT_ANCHOR_SCORE;
    } else if IMPRINT_KEYWORDS.iter().any(|k| anchor.contains(k)) {
        score += ANCHOR_KEYWORD_SCORE;
    }
    if IMPRINT_KEYWORDS.iter().any(|k| path.contains(k)) {
        score += HREF_KEYWORD_SCORE;
    }
    let penalized = mentions(PENALTY_KEYWORDS);

    if score > 0 {
        if penalized {
            score += PENALTY_SCORE;
        }
        LinkKind::Direct(score)
    } else if mentions(HUB_KEYWORDS) && !penalized {
        LinkKind::Staging
    } else {
        LinkKind::Unrelated
    }
}

/// Whether a candidate is a legal hub rather than the imprint itself.
pub(crate) fn is_hub(candidate: &LinkCandidate) -> bool {
    classify(candidate) == LinkKind::Staging
}

/// Splits candidates into direct and staging lists.
///
/// Direct candidates are ordered by descending score; ties keep document order.
pub(crate) fn rank_links(links: &[LinkCandidate]) -> RankedLinks<'_> {
    let mut scored = Vec::new();
    let mut ranked = RankedLinks::default();
    for link in links {
        match classify(link) {
            LinkKind::Direct(score) => scored.push((score, link)),
            LinkKind::Staging => ranked.staging.push(link),
            LinkKind::Unrelated => {}
        }
    }
    // Stable sort keeps document order among equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.direct = scored.into_iter().map(|(_, link)| link).collect();
    ranked
}

/// Lowercased path and query of an absolute URL, with `%20` and `+` read as spaces.
fn href_path(href: &str) -> String {
    let tail = match Url::parse(href) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => href.to_string(),
    };
    tail.to_lowercase().replace("%20", " ").replace('+', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str, text: &str) -> LinkCandidate {
        LinkCandidate::new(href, text)
    }

    #[test]
    fn test_scores() {
        assert_eq!(
            classify(&link("https://a.de/impressum", "Impressum")),
            LinkKind::Direct(17)
        );
        assert_eq!(
            classify(&link("https://a.de/page?id=7", "Impressum")),
            LinkKind::Direct(10)
        );
        assert_eq!(
            classify(&link("https://a.de/x", "Zum Impressum")),
            LinkKind::Direct(8)
        );
        assert_eq!(
            classify(&link("https://a.de/legal-notice", "Info")),
            LinkKind::Direct(7)
        );
        assert_eq!(
            classify(&link("https://a.de/impressum-datenschutz", "Impressum & Datenschutz")),
            LinkKind::Direct(13)
        );
    }

    #[test]
    fn test_hub_and_unrelated_links() {
        assert_eq!(
            classify(&link("https://a.de/rechtliches", "Rechtliches")),
            LinkKind::Staging
        );
        assert_eq!(
            classify(&link("https://a.de/legal", "Legal")),
            LinkKind::Staging
        );
        assert_eq!(
            classify(&link("https://a.de/legal/privacy", "Privacy")),
            LinkKind::Unrelated
        );
        assert_eq!(
            classify(&link("https://a.de/kontakt", "Kontakt")),
            LinkKind::Unrelated
        );
    }

    #[test]
    fn test_host_is_not_scored() {
        assert_eq!(
            classify(&link("https://impressum.example.de/shop", "Shop")),
            LinkKind::Unrelated
        );
    }

    #[test]
    fn test_rank_links_orders_by_score_then_document_order() {
        let links = vec![
            link("https://a.de/kontakt", "Kontakt"),
            link("https://a.de/x", "Zum Impressum"),
            link("https://a.de/rechtliches", "Rechtliches"),
            link("https://a.de/impressum", "Impressum"),
            link("https://a.de/y", "Impressum Seite"),
        ];
        let ranked = rank_links(&links);
        let direct: Vec<&str> = ranked.direct.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(
            direct,
            ["https://a.de/impressum", "https://a.de/x", "https://a.de/y"]
        );
        assert_eq!(ranked.staging.len(), 1);
        assert_eq!(ranked.staging[0].href, "https://a.de/rechtliches");
    }
}
