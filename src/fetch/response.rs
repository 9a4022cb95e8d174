//! Response body reading with a size cap.

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::error_handling::{categorize_reqwest_error, FetchError};

/// Reads a response body, keeping at most `max_bytes` bytes.
///
/// Bodies over the limit are truncated rather than rejected; the imprint link
/// is usually in the footer, but the normalizer only needs the head of a page
/// anyway. The bytes are decoded according to the `Content-Type` charset.
pub(crate) async fn read_body_capped(
    mut response: reqwest::Response,
    max_bytes: usize,
) -> Result<String, FetchError> {
    let charset = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_of);

    let mut buf: Vec<u8> = Vec::with_capacity(max_bytes.min(64 * 1024));
    let mut truncated = false;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| categorize_reqwest_error(&e))?
    {
        let remaining = max_bytes - buf.len();
        if chunk.len() > remaining {
            buf.extend_from_slice(&chunk[..remaining]);
            truncated = true;
            break;
        }
        buf.extend_from_slice(&chunk);
    }

    if truncated {
        debug!(
            "Truncated body of {} at {} bytes",
            response.url(),
            max_bytes
        );
    }

    Ok(decode_body(&buf, charset.as_deref()))
}

/// Extracts the lowercased charset parameter of a `Content-Type` value.
fn charset_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

/// Decodes body bytes with the encoding named by `charset`.
///
/// Unknown or missing labels fall back to UTF-8. A multi-byte sequence cut
/// off by truncation is dropped instead of becoming a replacement character.
fn decode_body(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let Some(capacity) = decoder.max_utf8_buffer_length(bytes.len()) else {
        return encoding.decode_without_bom_handling(bytes).0.into_owned();
    };

    let mut text = String::with_capacity(capacity);
    // last = false holds back an incomplete trailing sequence
    let (_, _, had_errors) = decoder.decode_to_string(bytes, &mut text, false);
    if had_errors {
        debug!("Body contained bytes invalid in {}", encoding.name());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_of() {
        assert_eq!(
            charset_of("text/html; charset=ISO-8859-1"),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(
            charset_of("text/html;charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_of("text/html"), None);
    }

    #[test]
    fn test_decode_body_latin1() {
        let bytes = vec![b'S', b't', b'r', 0xE4, b'e'];
        assert_eq!(decode_body(&bytes, Some("iso-8859-1")), "Sträe");
    }

    #[test]
    fn test_decode_body_drops_cut_multibyte_char() {
        let mut bytes = "Straße".as_bytes().to_vec();
        // Cut inside the two-byte 'ß'
        bytes.truncate(5);
        assert_eq!(decode_body(&bytes, None), "Stra");
    }

    #[test]
    fn test_decode_body_invalid_utf8_is_lossy() {
        let bytes = vec![b'a', 0xFF, b'b'];
        assert_eq!(decode_body(&bytes, Some("utf-8")), "a\u{FFFD}b");
    }

    #[test]
    fn test_decode_body_windows_1252_punctuation() {
        let bytes = [0x80, b' ', 0x96, b' ', b'G'];
        assert_eq!(decode_body(&bytes, Some("windows-1252")), "€ – G");
        // Browsers treat the latin1 label as windows-1252
        assert_eq!(decode_body(&bytes, Some("iso-8859-1")), "€ – G");
    }

    #[test]
    fn test_decode_body_central_european_charset() {
        let bytes = [0xA3, 0xF3, b'd', 0xBC];
        assert_eq!(decode_body(&bytes, Some("iso-8859-2")), "Łódź");
    }

    #[test]
    fn test_decode_body_unknown_label_falls_back_to_utf8() {
        let bytes = "Müller".as_bytes();
        assert_eq!(decode_body(bytes, Some("x-made-up")), "Müller");
    }
}
