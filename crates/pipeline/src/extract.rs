//! Locating the image attachment to analyse.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::PipelineError;
use crate::mime::{MimePart, ParsedEmail};

/// Content types accepted as image attachments.
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// The image part selected for label detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Base content type, e.g. `"image/jpeg"`.
    pub content_type: String,

    /// File name, if the part declared one.
    pub filename: Option<String>,

    /// Payload as carried by the part: base64 text for base64 parts.
    pub payload: Vec<u8>,
}

impl Attachment {
    fn from_part(part: &MimePart) -> Self {
        Self {
            content_type: base_content_type(&part.content_type),
            filename: part.filename.clone(),
            payload: part.payload.clone(),
        }
    }

    /// Decode the base64 payload into image bytes.
    ///
    /// Line breaks and other ASCII whitespace inside the payload are ignored.
    pub fn decode(&self) -> Result<Vec<u8>, PipelineError> {
        let compact: Vec<u8> = self
            .payload
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        Ok(STANDARD.decode(compact)?)
    }
}

/// Strip parameters from a content type and normalise it for comparison:
/// `"Image/PNG; name=x.png"` becomes `"image/png"`.
pub fn base_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Returns `true` if the part is a PNG or JPEG image.
pub fn is_image_attachment(part: &MimePart) -> bool {
    let base = base_content_type(&part.content_type);
    IMAGE_CONTENT_TYPES.contains(&base.as_str())
}

impl ParsedEmail {
    /// The first image part in document order, if any.
    pub fn first_image_attachment(&self) -> Option<Attachment> {
        self.parts()
            .find(|part| is_image_attachment(part))
            .map(Attachment::from_part)
    }
}

/// Parse raw email bytes and return the first image attachment.
///
/// Returns `Ok(None)` when the message holds no PNG or JPEG part.
pub fn extract(raw: &[u8]) -> Result<Option<Attachment>, PipelineError> {
    Ok(ParsedEmail::parse(raw)?.first_image_attachment())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_with_parts(parts: &[(&str, &str)]) -> String {
        let mut raw = String::from(
            "From: alice@example.com\r\n\
             Subject: photos\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"b1\"\r\n\r\n",
        );
        for (content_type, body) in parts {
            raw.push_str("--b1\r\n");
            raw.push_str(&format!("Content-Type: {content_type}\r\n"));
            raw.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
            raw.push_str(body);
            raw.push_str("\r\n");
        }
        raw.push_str("--b1--\r\n");
        raw
    }

    #[test]
    fn base_content_type_strips_parameters() {
        assert_eq!(base_content_type("image/png; name=photo.png"), "image/png");
        assert_eq!(base_content_type(" Image/JPEG ;charset=x"), "image/jpeg");
        assert_eq!(base_content_type("application/pdf"), "application/pdf");
        assert_eq!(base_content_type(""), "");
    }

    #[test]
    fn predicate_accepts_png_and_jpeg_only() {
        assert!(is_image_attachment(&MimePart::leaf("image/png", "")));
        assert!(is_image_attachment(&MimePart::leaf("image/jpeg", "")));
        assert!(is_image_attachment(&MimePart::leaf(
            "image/png; name=photo.png",
            ""
        )));
        assert!(!is_image_attachment(&MimePart::leaf("application/pdf", "")));
        assert!(!is_image_attachment(&MimePart::leaf("image/gif", "")));
        assert!(!is_image_attachment(&MimePart::leaf("text/plain", "")));
        assert!(!is_image_attachment(&MimePart::leaf("image/pngx", "")));
    }

    #[test]
    fn extract_returns_first_image_in_document_order() {
        let raw = email_with_parts(&[
            ("text/plain", "aGVsbG8="),
            ("image/jpeg; name=\"first.jpg\"", "Zmlyc3Q="),
            ("image/png", "c2Vjb25k"),
        ]);
        let attachment = extract(raw.as_bytes()).unwrap().expect("image found");
        assert_eq!(attachment.content_type, "image/jpeg");
        assert_eq!(attachment.filename.as_deref(), Some("first.jpg"));
        assert_eq!(attachment.decode().unwrap(), b"first");
    }

    #[test]
    fn extract_finds_png_with_name_parameter() {
        let raw = email_with_parts(&[("image/png; name=photo.png", "cG5n")]);
        let attachment = extract(raw.as_bytes()).unwrap().expect("image found");
        assert_eq!(attachment.content_type, "image/png");
        assert_eq!(attachment.decode().unwrap(), b"png");
    }

    #[test]
    fn extract_ignores_pdf() {
        let raw = email_with_parts(&[("application/pdf", "JVBERi0=")]);
        assert_eq!(extract(raw.as_bytes()).unwrap(), None);
    }

    #[test]
    fn extract_plain_message_has_no_attachment() {
        let raw = "From: bob@example.com\r\nSubject: hi\r\n\r\nno images here\r\n";
        assert_eq!(extract(raw.as_bytes()).unwrap(), None);
    }

    #[test]
    fn extract_empty_input_is_malformed() {
        assert!(matches!(extract(b""), Err(PipelineError::MalformedEmail(_))));
    }

    #[test]
    fn first_image_attachment_walks_nested_parts_first() {
        let root = MimePart::multipart(
            "multipart/mixed",
            vec![
                MimePart::multipart(
                    "multipart/related",
                    vec![
                        MimePart::leaf("text/html", "<img>"),
                        MimePart::leaf("image/png", "bmVzdGVk"),
                    ],
                ),
                MimePart::leaf("image/jpeg", "b3V0ZXI="),
            ],
        );
        let email = ParsedEmail { from: None, root };
        let attachment = email.first_image_attachment().unwrap();
        assert_eq!(attachment.content_type, "image/png");
        assert_eq!(attachment.decode().unwrap(), b"nested");
    }

    #[test]
    fn decode_ignores_line_breaks() {
        let attachment = Attachment {
            content_type: "image/jpeg".into(),
            filename: None,
            payload: b"AAECAwQF\r\nBgcICQ==\r\n".to_vec(),
        };
        assert_eq!(attachment.decode().unwrap(), (0u8..10).collect::<Vec<_>>());
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let attachment = Attachment {
            content_type: "image/png".into(),
            filename: None,
            payload: b"%%% not base64 %%%".to_vec(),
        };
        assert!(matches!(
            attachment.decode(),
            Err(PipelineError::AttachmentDecode(_))
        ));
    }
}
