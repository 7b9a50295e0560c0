//! Search query construction for the GDELT Doc API.
//!
//! Entity names arrive noisy: punctuation the API rejects, corporate suffixes
//! ("Inc", "GmbH", ...) that only narrow recall, and long official names that
//! match almost nothing verbatim. This module cleans a name, amplifies
//! multi-word names into an OR-group of prefix truncations, and appends
//! positive/negative term groups in the API's boolean grammar.
//!
//! The grammar produced only ever uses double-quoted phrases, `AND`, `OR`,
//! and unary `-"term"` negation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters the GDELT query parser chokes on. Everything outside word
/// characters, whitespace, double quotes, and parentheses is replaced with a
/// space before any further processing.
pub(crate) static SPECIAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s"()]+"#).unwrap());

/// Corporate-designation tokens stripped from entity names, compared
/// case-insensitively against whole whitespace-separated tokens.
///
/// The list is the punctuation-free form of the usual suffix zoo; entries
/// like "Inc." or "S.A." lose their punctuation in the special-character
/// strip that runs first, so only the bare tokens appear here. Single
/// letters are deliberately absent.
const CORPORATE_SUFFIXES: &[&str] = &[
    "ab", "abp", "ae", "ag", "as", "asa", "co", "com", "corp", "gmbh", "inc",
    "kgaa", "llc", "lp", "lpg", "ltd", "mfg", "nl", "nv", "oyj", "plc",
    "publ", "rl", "sa", "se", "sgps", "spa",
];

/// Clean an entity name into query-safe tokens.
///
/// Strips special characters, drops corporate-suffix tokens, collapses runs
/// of whitespace to single spaces, and trims the ends. Idempotent:
/// `clean(clean(x)) == clean(x)` for any input.
pub fn clean(name: &str) -> String {
    let stripped = SPECIAL_CHARS.replace_all(name, " ");
    stripped
        .split_whitespace()
        .filter(|token| {
            let lower = token.to_lowercase();
            !CORPORATE_SUFFIXES.contains(&lower.as_str())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Broaden a multi-word name into an OR-group of prefix truncations.
///
/// A name of more than two words, at least one of them longer than four
/// characters, becomes a parenthesized group of four quoted alternatives:
/// the first word, the full name, the first three words, and the first two
/// words. Shorter or all-short-word names pass through unchanged, since
/// truncating them would only produce generic noise terms.
pub fn amplify(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() <= 2 || !words.iter().any(|w| w.chars().count() > 4) {
        return name.to_string();
    }

    let first = words[0];
    let two = words[..2].join(" ");
    let three = words[..3].join(" ");
    format!("(\"{first}\" OR \"{name}\" OR \"{three}\" OR \"{two}\")")
}

/// Append positive term groups, and optionally negative terms, to a query.
///
/// Each positive group becomes ` AND ("alt1" OR "alt2" ...)`, in input
/// order. Negative fragments are always computed but only appended when
/// `apply_excludes` is set; the default pipeline leaves them off, matching
/// the corpus builds this tool replaces. Empty groups are skipped.
pub fn complete(
    base: &str,
    positives: &[Vec<String>],
    negatives: &[String],
    apply_excludes: bool,
) -> String {
    let mut query = base.to_string();

    for group in positives.iter().filter(|g| !g.is_empty()) {
        let alternatives = group
            .iter()
            .map(|alt| format!("\"{alt}\""))
            .collect::<Vec<_>>()
            .join(" OR ");
        query.push_str(&format!(" AND ({alternatives})"));
    }

    let negated = negated_terms(negatives);
    if apply_excludes {
        query.push_str(&negated);
    }

    query
}

/// Render negative terms as ` AND -"term"` fragments.
pub fn negated_terms(negatives: &[String]) -> String {
    negatives
        .iter()
        .map(|term| format!(" AND -\"{term}\""))
        .collect()
}

/// Build the final search query from a raw name and its term lists.
pub fn build(
    name: &str,
    positives: &[Vec<String>],
    negatives: &[String],
    apply_excludes: bool,
) -> String {
    complete(&amplify(&clean(name)), positives, negatives, apply_excludes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn clean_strips_special_characters() {
        assert_eq!(clean("Acme! Widgets@ #International"), "Acme Widgets International");
        assert_eq!(clean("a+b=c"), "a b c");
    }

    #[test]
    fn clean_drops_corporate_suffix_tokens() {
        assert_eq!(clean("Acme Corp."), "Acme");
        assert_eq!(clean("Siemens AG"), "Siemens");
        assert_eq!(clean("Henkel AG & Co. KGaA"), "Henkel");
        assert_eq!(clean("Telefonica S.A."), "Telefonica S A");
    }

    #[test]
    fn clean_keeps_non_suffix_tokens() {
        // "Holdings" is not a designation token and must survive.
        assert_eq!(
            clean("Acme Corp International Holdings"),
            "Acme International Holdings"
        );
    }

    #[test]
    fn clean_collapses_whitespace_and_trims() {
        assert_eq!(clean("  Acme   Widgets \t International "), "Acme Widgets International");
    }

    #[test]
    fn clean_is_idempotent() {
        for input in [
            "Acme Corp. International Holdings!",
            "  Banco Santander, S.A.  ",
            "Volkswagen AG",
            "plain name",
            "",
        ] {
            let once = clean(input);
            assert_eq!(clean(&once), once, "clean not idempotent for {input:?}");
        }
    }

    #[test]
    fn amplify_short_names_pass_through() {
        assert_eq!(amplify("Acme"), "Acme");
        assert_eq!(amplify("Acme Widgets"), "Acme Widgets");
    }

    #[test]
    fn amplify_all_short_words_pass_through() {
        // Three words, but none longer than four characters.
        assert_eq!(amplify("Big Red Dog"), "Big Red Dog");
    }

    #[test]
    fn amplify_produces_four_quoted_alternatives() {
        let name = "Acme International Holdings Group";
        let amplified = amplify(name);

        assert!(amplified.starts_with('('));
        assert!(amplified.ends_with(')'));
        assert_eq!(amplified.matches(" OR ").count(), 3);
        assert_eq!(amplified.matches('"').count(), 8);
        assert!(amplified.contains(&format!("\"{name}\"")));
        assert!(amplified.contains("\"Acme\""));
        assert!(amplified.contains("\"Acme International\""));
        assert!(amplified.contains("\"Acme International Holdings\""));
    }

    #[test]
    fn complete_with_no_groups_is_identity() {
        assert_eq!(complete("base", &[], &[], false), "base");
        assert_eq!(complete("base", &[], &[], true), "base");
    }

    #[test]
    fn complete_appends_or_joined_group() {
        let q = complete("q", &groups(&[&["A", "B"]]), &[], false);
        assert_eq!(q, "q AND (\"A\" OR \"B\")");
    }

    #[test]
    fn complete_appends_groups_in_order() {
        let q = complete("q", &groups(&[&["fraud"], &["court", "trial"]]), &[], false);
        assert_eq!(q, "q AND (\"fraud\") AND (\"court\" OR \"trial\")");
    }

    #[test]
    fn negatives_are_off_by_default() {
        let negatives = vec!["sports".to_string()];
        assert_eq!(complete("q", &[], &negatives, false), "q");
    }

    #[test]
    fn negatives_append_when_toggled_on() {
        let negatives = vec!["sports".to_string(), "opinion".to_string()];
        assert_eq!(
            complete("q", &[], &negatives, true),
            "q AND -\"sports\" AND -\"opinion\""
        );
    }

    #[test]
    fn build_amplifies_cleaned_name_and_appends_positives() {
        let q = build(
            "Acme Corp International Holdings",
            &groups(&[&["fraud"]]),
            &[],
            false,
        );

        // "Corp" stripped before amplification; "Holdings" retained.
        assert!(q.contains("\"Acme International Holdings\""));
        assert!(!q.contains("Corp"));
        assert_eq!(q.matches(" OR ").count(), 3);
        assert!(q.ends_with(" AND (\"fraud\")"));
    }

    #[test]
    fn build_leaves_two_word_names_unamplified() {
        assert_eq!(build("Acme Widgets", &[], &[], false), "Acme Widgets");
    }
}
