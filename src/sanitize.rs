//! CSV-safety normalization of extracted article content.
//!
//! Body and summary text travel into a line-oriented delimited file where
//! embedded newlines break row parsing and semicolons collide with the
//! sub-field join delimiter used for authors and keywords. [`sanitize`]
//! scrubs both fields; the remaining fields pass through untouched.

use crate::models::ArticleContent;
use crate::query::SPECIAL_CHARS;

/// Scrub the free-text fields of an extracted article.
///
/// Newlines become single spaces, semicolons become commas, special
/// characters are stripped, and exact double-space sequences are removed in
/// one pass. That last step is intentionally not idempotent: the character
/// strip can leave double spaces a single left-to-right pass no longer
/// sees. Previously generated corpus files carry this exact behavior, so it
/// is kept rather than generalized to a full whitespace collapse.
pub fn sanitize(mut content: ArticleContent) -> ArticleContent {
    content.body = scrub(&content.body);
    content.summary = scrub(&content.summary);
    content
}

fn scrub(text: &str) -> String {
    let text = text.replace(['\n', '\r'], " ");
    let text = text.replace(';', ",");
    let text = SPECIAL_CHARS.replace_all(&text, " ");
    text.replace("  ", "")
}
