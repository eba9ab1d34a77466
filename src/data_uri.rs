//! `data:` URI encoding and decoding for embedded images.
//!
//! Only the base64 form is produced: `data:image/<subtype>;base64,<payload>`.
//! The MIME subtype always comes from the asset itself (response header,
//! magic bytes or file extension) and is never assumed.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::error::{AssetError, Result};

const DATA_PREFIX: &str = "data:";
const IMAGE_DATA_PREFIX: &str = "data:image/";

/// MIME type for inline vector graphics.
pub const SVG_MIME: &str = "image/svg+xml";

/// Does `reference` already carry an embedded image?
pub fn is_embedded(reference: &str) -> bool {
    reference
        .get(..IMAGE_DATA_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(IMAGE_DATA_PREFIX))
}

/// Build a base64 data URI for `bytes` with the given MIME type.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("{DATA_PREFIX}{mime};base64,{}", BASE64_STD.encode(bytes))
}

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Parse a base64 `data:` URI into its MIME type and raw bytes.
pub fn parse(uri: &str) -> Result<DataUri> {
    let head = uri.get(..DATA_PREFIX.len()).unwrap_or_default();
    if !head.eq_ignore_ascii_case(DATA_PREFIX) {
        return Err(AssetError::InvalidDataUri {
            reason: "missing `data:` prefix".to_string(),
        });
    }
    let rest = &uri[DATA_PREFIX.len()..];
    let (header, payload) = rest.split_once(',').ok_or_else(|| AssetError::InvalidDataUri {
        reason: "missing `,` between header and payload".to_string(),
    })?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(AssetError::InvalidDataUri {
            reason: "only base64 payloads are supported".to_string(),
        });
    }

    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64_STD
        .decode(cleaned.as_bytes())
        .map_err(|e| AssetError::InvalidDataUri {
            reason: format!("base64 decode error: {e}"),
        })?;

    Ok(DataUri { mime, bytes })
}

/// Pick the MIME type for an asset.
///
/// Preference order: an `image/*` content type reported by the transport,
/// then the format recognised from the leading bytes, then the extension of
/// `reference`. Returns `None` when none of these identify an image.
pub fn detect_mime(content_type: Option<&str>, bytes: &[u8], reference: &str) -> Option<String> {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if essence.starts_with("image/") {
            return Some(essence);
        }
    }

    if let Ok(format) = image::guess_format(bytes) {
        return Some(format.to_mime_type().to_string());
    }

    if looks_like_svg(bytes) {
        return Some(SVG_MIME.to_string());
    }

    mime_from_extension(reference).map(str::to_string)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    (trimmed.starts_with("<?xml") || trimmed.starts_with("<svg")) && text.contains("<svg")
}

fn mime_from_extension(reference: &str) -> Option<&'static str> {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some(SVG_MIME),
        "ico" => Some("image/x-icon"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    #[test]
    fn embedded_prefix_is_case_insensitive() {
        assert!(is_embedded("data:image/png;base64,AAAA"));
        assert!(is_embedded("DATA:Image/jpeg;base64,AAAA"));
        assert!(!is_embedded("data:text/plain,hello"));
        assert!(!is_embedded("assets/logo.png"));
        assert!(!is_embedded("data"));
    }

    #[test]
    fn parse_recovers_mime_and_bytes() {
        let uri = format!("data:image/png;base64,{PNG_1X1}");
        let parsed = parse(&uri).unwrap();
        assert_eq!(parsed.mime, "image/png");
        assert_eq!(&parsed.bytes[1..4], b"PNG");
        assert_eq!(encode(&parsed.mime, &parsed.bytes), uri);
    }

    #[test]
    fn parse_rejects_non_base64_payloads() {
        assert!(parse("data:image/svg+xml;utf8,<svg/>").is_err());
        assert!(parse("https://example.com/a.png").is_err());
        assert!(parse("data:image/png;base64").is_err());
    }

    #[test]
    fn content_type_wins_when_it_names_an_image() {
        let mime = detect_mime(Some("image/webp; q=1"), b"junk", "a.png");
        assert_eq!(mime.as_deref(), Some("image/webp"));
    }

    #[test]
    fn magic_bytes_beat_extension() {
        let bytes = BASE64_STD.decode(PNG_1X1).unwrap();
        let mime = detect_mime(Some("application/octet-stream"), &bytes, "photo.jpg");
        assert_eq!(mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn svg_is_sniffed_from_markup() {
        let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"></svg>"#;
        assert_eq!(detect_mime(None, svg, "icon").as_deref(), Some(SVG_MIME));
    }

    #[test]
    fn extension_is_last_resort() {
        assert_eq!(
            detect_mime(None, b"????", "assets/icons/fb.SVG?v=2").as_deref(),
            Some(SVG_MIME)
        );
        assert_eq!(detect_mime(None, b"????", "assets/readme"), None);
    }
}
