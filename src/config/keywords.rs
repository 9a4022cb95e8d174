//! Locator keyword tables.
//!
//! Lowercase terms matched against link hrefs and anchor text. To support a new
//! locale, add its terms here.

/// Terms that identify an imprint page directly.
pub const IMPRINT_KEYWORDS: &[&str] = &[
    "impressum",
    "imprint",
    "legal notice",
    "legal-notice",
    "legal_notice",
    "legalnotice",
    "mentions légales",
    "mentions-legales",
    "mentions legales",
    "aviso legal",
    "aviso-legal",
    "colofon",
    "anbieterkennzeichnung",
    "site notice",
];

/// Anchor texts that count as an exact imprint match.
pub const EXACT_IMPRINT_ANCHORS: &[&str] = &[
    "impressum",
    "imprint",
    "legal notice",
    "mentions légales",
    "aviso legal",
];

/// Terms that identify a general legal hub (a staging candidate).
pub const HUB_KEYWORDS: &[&str] = &[
    "legal",
    "rechtliches",
    "rechtliche hinweise",
    "rechtliche-hinweise",
    "juridique",
];

/// Terms that make a link less likely to be the imprint.
pub const PENALTY_KEYWORDS: &[&str] = &["privacy", "datenschutz", "cookie", "terms", "agb"];

/// Path suffixes probed against the site origin when no link qualifies.
pub const FALLBACK_PATHS: &[&str] = &[
    "/impressum",
    "/imprint",
    "/legal/imprint",
    "/legal-notice",
    "/impressum.html",
    "/imprint.html",
    "/impressum.php",
    "/de/impressum",
    "/en/imprint",
];
