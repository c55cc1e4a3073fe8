//! Pulling field text out of a document's raw line sequence.

use lazy_static::lazy_static;
use regex::Regex;

pub const HEADLINE: (&str, &str) = ("<HEADLINE>", "</HEADLINE>");
pub const GRAPHIC: (&str, &str) = ("<GRAPHIC>", "</GRAPHIC>");
pub const TEXT: (&str, &str) = ("<TEXT>", "</TEXT>");

const PARAGRAPH_START: &str = "<P>";
const PARAGRAPH_END: &str = "</P>";

lazy_static! {
    static ref MARKUP: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
}

/// Concatenate the lines between `start` and the next `end`, skipping lines
/// that are exactly a paragraph marker.
///
/// Every line equal to `start` opens a region, so a repeated start tag
/// contributes its content again, including any content shared with an
/// earlier, still unterminated region. A region with no closing tag runs to
/// the last line. Returns an empty string when `start` never appears.
pub fn extract_text_by_tag<S: AsRef<str>>(lines: &[S], start: &str, end: &str) -> String {
    let mut text = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if line.as_ref() != start {
            continue;
        }
        for inner in &lines[idx + 1..] {
            let inner = inner.as_ref();
            if inner == end {
                break;
            }
            if inner != PARAGRAPH_START && inner != PARAGRAPH_END {
                text.push_str(inner);
            }
        }
    }
    text
}

/// Headline, figure caption and body joined by single spaces.
pub fn indexable_text<S: AsRef<str>>(lines: &[S]) -> String {
    [HEADLINE, GRAPHIC, TEXT]
        .iter()
        .map(|(start, end)| extract_text_by_tag(lines, start, end))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Body followed by figure caption with any remaining markup removed.
pub fn summary_text<S: AsRef<str>>(lines: &[S]) -> String {
    let body = extract_text_by_tag(lines, TEXT.0, TEXT.1);
    let caption = extract_text_by_tag(lines, GRAPHIC.0, GRAPHIC.1);
    let joined = if caption.is_empty() { body } else { format!("{body} {caption}") };
    strip_markup(&joined)
}

pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}
