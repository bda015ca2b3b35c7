//! Pattern tables and matching helpers shared by both extraction modes.
//!
//! ID shapes are an explicit ordered rule list: the first rule with a
//! match wins, by rule priority rather than match position. All patterns
//! are compiled once.

use once_cell::sync::Lazy;
use regex::Regex;

/// One ID-shape rule. Rules are tried in declaration order.
pub struct IdRule {
    /// Rule name, used in logs and tests.
    pub name: &'static str,
    /// The shape to match.
    pub pattern: Regex,
    /// When set, a candidate must contain both a letter and a digit. Used
    /// by the generic fallback so long serial runs don't pass as IDs.
    pub mixed_only: bool,
}

/// ID-shape rules, most specific first.
pub static ID_RULES: Lazy<Vec<IdRule>> = Lazy::new(|| {
    vec![
        IdRule {
            name: "epic",
            pattern: Regex::new(r"\b[A-Z]{3}[0-9]{7}\b").unwrap(),
            mixed_only: false,
        },
        IdRule {
            name: "slashed",
            pattern: Regex::new(r"\b[A-Z0-9]+(?:/[0-9]+)+\b").unwrap(),
            mixed_only: false,
        },
        IdRule {
            name: "generic",
            pattern: Regex::new(r"\b[A-Z0-9]{6,}\b").unwrap(),
            mixed_only: true,
        },
    ]
});

/// Relation vocabulary, in match-priority order. English terms first, then
/// the transliterations seen on bilingual rolls.
pub const RELATION_TERMS: [&str; 16] = [
    "Father", "Mother", "Husband", "Wife", "Son", "Daughter", "Brother", "Sister", "Pita", "Mata",
    "Pati", "Patni", "Putra", "Putri", "Bhai", "Bhauni",
];

static RELATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    RELATION_TERMS
        .iter()
        .map(|term| Regex::new(&format!(r"(?i)\b{term}\b")).unwrap())
        .collect()
});

static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]{1,6}\b").unwrap());

static DASH_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9]{1,6})\s*[-\u{2013}\u{2014}]\s*([0-9]{1,6})\b").unwrap());

static SERIAL_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{1,6}$").unwrap());

static FRACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]{1,3}/[0-9]{1,6}\b").unwrap());

static BARE_FRACTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,3}/[0-9]{1,6}$").unwrap());

static SINGLE_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z]\b").unwrap());

static CATEGORY_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[ABC]\b").unwrap());

static CATEGORY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([ABC])\b\s*(.*)$").unwrap());

/// Collapses all whitespace runs (including newlines and tabs) to single
/// spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds an ID using the ordered rule list. The first rule that matches
/// anywhere in the text wins; later rules are not consulted.
pub fn match_id(text: &str) -> Option<&str> {
    for rule in ID_RULES.iter() {
        for m in rule.pattern.find_iter(text) {
            if rule.mixed_only && !is_mixed_alphanumeric(m.as_str()) {
                continue;
            }
            return Some(m.as_str());
        }
    }
    None
}

fn is_mixed_alphanumeric(candidate: &str) -> bool {
    candidate.chars().any(|c| c.is_ascii_alphabetic())
        && candidate.chars().any(|c| c.is_ascii_digit())
}

/// First relation term present in the text, in vocabulary order (not text
/// order).
pub fn first_relation(text: &str) -> Option<&'static str> {
    RELATION_TERMS
        .iter()
        .zip(RELATION_PATTERNS.iter())
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(term, _)| *term)
}

/// True when the text contains any relation vocabulary term.
pub fn contains_relation(text: &str) -> bool {
    RELATION_PATTERNS.iter().any(|p| p.is_match(text))
}

/// All standalone 1-6 digit tokens, in order of appearance.
pub fn numeric_tokens(text: &str) -> Vec<&str> {
    NUMERIC_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// A dash/en-dash/em-dash separated numeric range, when present.
pub fn dash_range(text: &str) -> Option<(&str, &str)> {
    DASH_RANGE.captures(text).map(|caps| {
        (
            caps.get(1).unwrap().as_str(),
            caps.get(2).unwrap().as_str(),
        )
    })
}

/// True when the (trimmed) line is a pure short digit string, the shape
/// that opens a record in whole-page mode.
pub fn is_serial_line(line: &str) -> bool {
    SERIAL_LINE.is_match(line)
}

/// First `part/serial` numeric fraction in the text, when present.
pub fn find_fraction(text: &str) -> Option<&str> {
    FRACTION.find(text).map(|m| m.as_str())
}

/// True when the (trimmed) line consists of a numeric fraction alone.
pub fn is_bare_fraction_line(line: &str) -> bool {
    BARE_FRACTION_LINE.is_match(line)
}

/// First isolated single-letter token of any case.
pub fn first_single_letter(text: &str) -> Option<&str> {
    SINGLE_LETTER.find(text).map(|m| m.as_str())
}

/// First isolated letter drawn from the category set.
pub fn first_category(text: &str) -> Option<&str> {
    CATEGORY_LETTER.find(text).map(|m| m.as_str())
}

/// Splits a leading bounded category letter off a line, returning the
/// letter and the remainder.
pub fn split_category_prefix(line: &str) -> Option<(&str, &str)> {
    CATEGORY_PREFIX.captures(line).map(|caps| {
        (
            caps.get(1).unwrap().as_str(),
            caps.get(2).unwrap().as_str(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epic_shape_wins_over_everything() {
        let text = "entry ABC1234567 also OR/02/009/22647 and XYZQRS99";
        assert_eq!(match_id(text), Some("ABC1234567"));
    }

    #[test]
    fn slashed_shape_beats_generic() {
        // Rule order, not match position: the generic run comes first in
        // the text but the slashed rule has priority.
        let text = "XY1234567 then OR/02/009/22647";
        assert_eq!(match_id(text), Some("OR/02/009/22647"));
    }

    #[test]
    fn generic_requires_mixed_content() {
        assert_eq!(match_id("code 1234567 here"), None);
        assert_eq!(match_id("code XY1234567 here"), Some("XY1234567"));
    }

    #[test]
    fn no_id_in_plain_text() {
        assert_eq!(match_id("Son of Hari 12 45"), None);
    }

    #[test]
    fn relation_priority_is_vocabulary_order() {
        // "Son" appears first in the text, but "Father" precedes it in the
        // vocabulary.
        assert_eq!(first_relation("Son of his Father"), Some("Father"));
        assert_eq!(first_relation("son lives here"), Some("Son"));
        assert_eq!(first_relation("pita of the house"), Some("Pita"));
        assert_eq!(first_relation("grandson"), None);
    }

    #[test]
    fn numeric_tokens_are_bounded_and_short() {
        assert_eq!(numeric_tokens("a 12 b 345678 c 1234567"), ["12", "345678"]);
        // Digit runs inside slashes count as standalone tokens.
        assert_eq!(numeric_tokens("04/345"), ["04", "345"]);
    }

    #[test]
    fn dash_range_variants() {
        assert_eq!(dash_range("serial 10-20 other"), Some(("10", "20")));
        assert_eq!(dash_range("pages 5 \u{2013} 9"), Some(("5", "9")));
        assert_eq!(dash_range("no range 10 20"), None);
    }

    #[test]
    fn serial_lines_are_pure_short_digits() {
        assert!(is_serial_line("12"));
        assert!(is_serial_line("123456"));
        assert!(!is_serial_line("1234567"));
        assert!(!is_serial_line("12a"));
        assert!(!is_serial_line(""));
    }

    #[test]
    fn fraction_detection() {
        assert_eq!(find_fraction("A Son 04/345"), Some("04/345"));
        assert!(is_bare_fraction_line("04/345"));
        assert!(!is_bare_fraction_line("A 04/345"));
        assert_eq!(find_fraction("nothing here"), None);
    }

    #[test]
    fn category_prefix_split() {
        assert_eq!(split_category_prefix("A Son 04/345"), Some(("A", "Son 04/345")));
        assert_eq!(split_category_prefix("B"), Some(("B", "")));
        assert_eq!(split_category_prefix("ABC1234567"), None);
        assert_eq!(split_category_prefix("D Son"), None);
    }

    #[test]
    fn single_letter_and_category() {
        assert_eq!(first_single_letter("word k word"), Some("k"));
        assert_eq!(first_category("x B y"), Some("B"));
        assert_eq!(first_category("x D y"), None);
    }

    #[test]
    fn whitespace_normalization() {
        assert_eq!(normalize_whitespace("  a\tb\n\nc  "), "a b c");
    }
}
