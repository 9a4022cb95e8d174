//! Utilities for sanitizing error messages and bounding text length.
//!
//! Removes control characters from error messages before they reach a result
//! record, and truncates text without splitting a character.

/// Sanitizes an error message by removing control characters.
///
/// Control characters (0x00-0x1F, except newline/tab/carriage return) are
/// removed; everything else, including non-ASCII text, is kept.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitizes and truncates an error message to `MAX_ERROR_MESSAGE_LENGTH` chars.
///
/// A truncated message ends with an indicator carrying the original length.
pub fn sanitize_and_truncate_error_message(message: &str) -> String {
    let sanitized = sanitize_error_message(message);
    let char_count = sanitized.chars().count();

    if char_count > crate::config::MAX_ERROR_MESSAGE_LENGTH {
        // Leave room for the truncation message
        let keep = crate::config::MAX_ERROR_MESSAGE_LENGTH.saturating_sub(50);
        format!(
            "{}... (truncated, original length: {} chars)",
            truncate_chars(&sanitized, keep),
            char_count
        )
    } else {
        sanitized
    }
}

/// Returns the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Truncates `text` to at most `max_chars` characters, cutting at the last
/// whitespace boundary and appending an ellipsis.
///
/// Text that already fits is returned unchanged. When the first `max_chars`
/// characters hold no whitespace, the cut is made at `max_chars`.
pub fn truncate_at_whitespace(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    // One char is reserved for the ellipsis
    let head = truncate_chars(text, max_chars.saturating_sub(1));
    let cut = head
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, _)| idx)
        .filter(|idx| *idx > 0)
        .unwrap_or(head.len());
    format!("{}…", head[..cut].trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_error_message_removes_control_chars() {
        let input = "Error\x00message\x01with\x02control\x03chars";
        let output = sanitize_error_message(input);
        assert_eq!(output, "Errormessagewithcontrolchars");
    }

    #[test]
    fn test_sanitize_error_message_preserves_newlines_and_tabs() {
        let input = "Error\nmessage\twith\r\nwhitespace";
        assert_eq!(sanitize_error_message(input), input);
    }

    #[test]
    fn test_sanitize_error_message_preserves_unicode() {
        let input = "Fehler beim Abruf: Straße 测试 🚀";
        assert_eq!(sanitize_error_message(input), input);
    }

    #[test]
    fn test_sanitize_and_truncate_long_message() {
        let input = "ü".repeat(crate::config::MAX_ERROR_MESSAGE_LENGTH + 10);
        let output = sanitize_and_truncate_error_message(&input);
        assert!(output.contains("truncated, original length"));
        assert!(output.chars().count() <= crate::config::MAX_ERROR_MESSAGE_LENGTH);
    }

    #[test]
    fn test_sanitize_and_truncate_short_message_unchanged() {
        assert_eq!(
            sanitize_and_truncate_error_message("No imprint page found"),
            "No imprint page found"
        );
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("äöü", 2), "äö");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_truncate_at_whitespace() {
        let text = "Example GmbH Musterstraße 1 Berlin";
        let out = truncate_at_whitespace(text, 20);
        assert!(out.ends_with('…'));
        assert!(out.chars().count() <= 20);
        assert_eq!(out, "Example GmbH…");
    }

    #[test]
    fn test_truncate_at_whitespace_without_whitespace() {
        let out = truncate_at_whitespace("abcdefghij", 5);
        assert_eq!(out, "abcd…");
    }

    #[test]
    fn test_truncate_at_whitespace_fits() {
        assert_eq!(truncate_at_whitespace("short", 10), "short");
    }
}
