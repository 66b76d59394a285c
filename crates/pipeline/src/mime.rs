//! MIME tree model for inbound emails.
//!
//! Raw bytes are parsed with `mailparse` and copied into an owned tree of
//! [`MimePart`]s so the rest of the pipeline never deals with borrowed parser
//! state. Payloads are kept exactly as they appear in the message (still
//! transfer-encoded).

use mailparse::body::Body;
use mailparse::{MailHeaderMap, ParsedMail};

use crate::error::PipelineError;

/// One node of the MIME tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    /// Declared `Content-Type`, parameters included (e.g. `"image/png; name=a.png"`).
    pub content_type: String,

    /// Declared `Content-Disposition`, if any.
    pub disposition: Option<String>,

    /// Declared `Content-Transfer-Encoding`, lowercased, if any.
    pub transfer_encoding: Option<String>,

    /// File name from the disposition `filename` or content-type `name` parameter.
    pub filename: Option<String>,

    /// Body bytes as they appear in the message.
    pub payload: Vec<u8>,

    /// Nested parts of a multipart container, in document order.
    pub children: Vec<MimePart>,
}

impl MimePart {
    /// A leaf part with the given content type and payload.
    pub fn leaf(content_type: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            disposition: None,
            transfer_encoding: None,
            filename: None,
            payload: payload.into(),
            children: Vec::new(),
        }
    }

    /// A multipart container holding the given children.
    pub fn multipart(content_type: impl Into<String>, children: Vec<MimePart>) -> Self {
        Self {
            children,
            ..Self::leaf(content_type, Vec::new())
        }
    }

    fn from_parsed(part: &ParsedMail<'_>) -> Self {
        let content_type = part
            .headers
            .get_first_value("Content-Type")
            .unwrap_or_else(|| part.ctype.mimetype.clone());
        let filename = part
            .get_content_disposition()
            .params
            .get("filename")
            .or_else(|| part.ctype.params.get("name"))
            .cloned();

        Self {
            content_type,
            disposition: part.headers.get_first_value("Content-Disposition"),
            transfer_encoding: part
                .headers
                .get_first_value("Content-Transfer-Encoding")
                .map(|v| v.trim().to_ascii_lowercase()),
            filename,
            payload: raw_body(part),
            children: children_of(part),
        }
    }
}

// mailparse does not descend into `message/rfc822`; the embedded message
// becomes the single child of the wrapping part.
fn children_of(part: &ParsedMail<'_>) -> Vec<MimePart> {
    if part.subparts.is_empty()
        && part.ctype.mimetype.eq_ignore_ascii_case("message/rfc822")
        && let Some(inner) = embedded_message(part)
    {
        return vec![inner];
    }
    part.subparts.iter().map(MimePart::from_parsed).collect()
}

fn embedded_message(part: &ParsedMail<'_>) -> Option<MimePart> {
    let body = part.get_body_raw().ok()?;
    let inner = mailparse::parse_mail(&body).ok()?;
    if inner.headers.is_empty() {
        return None;
    }
    Some(MimePart::from_parsed(&inner))
}

fn raw_body(part: &ParsedMail<'_>) -> Vec<u8> {
    match part.get_body_encoded() {
        Body::Base64(body) | Body::QuotedPrintable(body) => body.get_raw().to_vec(),
        Body::SevenBit(body) | Body::EightBit(body) => body.get_raw().to_vec(),
        Body::Binary(body) => body.get_raw().to_vec(),
    }
}

/// A parsed inbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEmail {
    /// The `From` header value, verbatim (encoded-words are not decoded).
    pub from: Option<String>,

    /// The outermost part.
    pub root: MimePart,
}

impl ParsedEmail {
    /// Parse raw email bytes.
    ///
    /// Fails with [`PipelineError::MalformedEmail`] when the bytes are empty,
    /// carry no header block, or are rejected by the MIME parser.
    pub fn parse(raw: &[u8]) -> Result<Self, PipelineError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(PipelineError::MalformedEmail("message is empty".to_owned()));
        }

        let parsed =
            mailparse::parse_mail(raw).map_err(|e| PipelineError::MalformedEmail(e.to_string()))?;
        if parsed.headers.is_empty() {
            return Err(PipelineError::MalformedEmail(
                "message has no headers".to_owned(),
            ));
        }

        // Kept as raw header text: encoded-words stay encoded for the reply.
        let from = parsed
            .headers
            .get_first_header("From")
            .map(|h| String::from_utf8_lossy(h.get_value_raw()).trim().to_owned())
            .filter(|v| !v.is_empty());

        Ok(Self {
            from,
            root: MimePart::from_parsed(&parsed),
        })
    }

    /// All parts in document order: depth-first, parent before children.
    pub fn parts(&self) -> Parts<'_> {
        Parts {
            stack: vec![&self.root],
        }
    }
}

/// Pre-order iterator over a MIME tree. See [`ParsedEmail::parts`].
#[derive(Debug)]
pub struct Parts<'a> {
    stack: Vec<&'a MimePart>,
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a MimePart;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.children.iter().rev());
        Some(part)
    }
}
