//! Rendering detected labels into a reply.

use lensmail_core::{Label, REPLY_CHARSET, REPLY_SUBJECT, ReplyMessage};

/// First line of the plain-text body.
pub const TEXT_PREAMBLE: &str = "The following labels were detected in your image:";

const HTML_HEADER: &str = "<html>\n\
<head></head>\n\
<body>\n\
<h1>Labels detected in your image</h1>\n\
<pre>";

// The <pre> opened by the header is never closed and label names are not
// HTML-escaped; the rendered output is kept as-is.
const HTML_FOOTER: &str = "\n\
<p>This message was generated automatically.</p>\n\
</body>\n\
</html>\n";

/// Build the reply for `labels`, addressed to `target` and sent from `from`.
///
/// Pure and deterministic: the same inputs always produce byte-identical
/// bodies. Labels are rendered in the given order, one `"<name>: <confidence>"`
/// line each.
pub fn compose(labels: &[Label], target: &str, from: &str) -> ReplyMessage {
    ReplyMessage {
        to: target.to_owned(),
        from: from.to_owned(),
        subject: REPLY_SUBJECT.to_owned(),
        text_body: render_text(labels),
        html_body: render_html(labels),
        charset: REPLY_CHARSET.to_owned(),
    }
}

fn label_lines(labels: &[Label]) -> String {
    labels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text body: preamble, then one line per label.
pub fn render_text(labels: &[Label]) -> String {
    format!("{TEXT_PREAMBLE}\n{}", label_lines(labels))
}

/// HTML body: heading, label lines in a preformatted block, footer.
pub fn render_html(labels: &[Label]) -> String {
    format!("{HTML_HEADER}{}{HTML_FOOTER}", label_lines(labels))
}
