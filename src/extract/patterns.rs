//! Single-field lexical extractors over ordered regex pattern tables.
//!
//! Each field has its own table, most-specific pattern first (a labeled
//! "итого: N" beats a bare "N ккал"). A pattern may match many times because
//! per-ingredient lines mention numbers before the final tally; the extractor
//! therefore takes the LAST match of the first pattern that matches at all.
//! That rule is a behavioral contract, not an implementation detail.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Numbers at or below this are serving counts ("2 яйца"), not calories.
const CALORIE_FALLBACK_MIN: i64 = 10;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid extractor pattern"))
        .collect()
}

// Ordered calorie patterns. Summary labels first, bare unit mentions later,
// hedging phrases ("примерно 300") last.
static CALORIE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)итого:?\s*(\d+)",
        r"(?i)всего:?\s*(\d+)",
        r"(?i)общая\s+калорийность:?\s*(\d+)",
        r"(?i)калорийность:?\s*(\d+)",
        r"(?i)калории:?\s*(\d+)",
        r"(?i)(\d+)\s*ккал",
        r"(?i)(\d+)\s*калори[йяеи]",
        r"=\s*(\d+)",
        r"(?i)составляет?\s*(\d+)",
        r"(?i)примерно\s*(\d+)",
        r"(?i)около\s*(\d+)",
    ])
});

static PROTEIN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(\d+(?:[.,]\d+)?)\s*(?:грамм[а-яё]*|гр|г)\.?\s*белк[а-яё]*",
        r"(?i)белк[а-яё]*\s*:?\s*(\d+(?:[.,]\d+)?)",
        r"(?i)\bб\s*:\s*(\d+(?:[.,]\d+)?)",
        r"(?i)protein:?\s*(\d+(?:[.,]\d+)?)",
        r"(?i)(\d+(?:[.,]\d+)?)\s*g\s*protein",
    ])
});

static FAT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(\d+(?:[.,]\d+)?)\s*(?:грамм[а-яё]*|гр|г)\.?\s*жир[а-яё]*",
        r"(?i)жир[а-яё]*\s*:?\s*(\d+(?:[.,]\d+)?)",
        r"(?i)\bж\s*:\s*(\d+(?:[.,]\d+)?)",
        r"(?i)fat:?\s*(\d+(?:[.,]\d+)?)",
        r"(?i)(\d+(?:[.,]\d+)?)\s*g\s*fat",
    ])
});

static CARBS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(\d+(?:[.,]\d+)?)\s*(?:грамм[а-яё]*|гр|г)\.?\s*углевод[а-яё]*",
        r"(?i)углевод[а-яё]*\s*:?\s*(\d+(?:[.,]\d+)?)",
        r"(?i)\bу\s*:\s*(\d+(?:[.,]\d+)?)",
        r"(?i)carbs?:?\s*(\d+(?:[.,]\d+)?)",
        r"(?i)(\d+(?:[.,]\d+)?)\s*g\s*carbs?",
    ])
});

static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").expect("bare number pattern"));

static ANY_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("integer pattern"));

/// Parse a numeral accepting both "." and "," as the decimal separator.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok()
}

/// Last match of the first pattern that matches at all.
fn scan_last(patterns: &[Regex], text: &str) -> Option<f64> {
    for re in patterns {
        let last = re
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_owned()))
            .last();
        if let Some(raw) = last {
            return parse_number(&raw);
        }
    }
    None
}

fn bare_number(text: &str) -> Option<f64> {
    let stripped = text.trim();
    if BARE_NUMBER.is_match(stripped) {
        parse_number(stripped)
    } else {
        None
    }
}

/// Extract the most likely calorie total from narrative text.
///
/// Returns `None` for absence — never an error. When no labeled pattern
/// matches, falls back to the last plausible integer in the text and logs the
/// extraction as low-confidence.
pub fn extract_calories(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Some(v) = bare_number(text) {
        return Some(v.trunc());
    }
    if let Some(v) = scan_last(&CALORIE_PATTERNS, text) {
        return Some(v.trunc());
    }

    // Per-ingredient arithmetic places partial values first, so the last
    // plausible number is the best total guess.
    let fallback = ANY_INTEGER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<i64>().ok())
        .filter(|n| *n > CALORIE_FALLBACK_MIN)
        .last();
    if let Some(n) = fallback {
        warn!(value = n, "calorie extraction fell back to unlabeled number");
        return Some(n as f64);
    }
    None
}

pub fn extract_protein(text: &str) -> Option<f64> {
    let text = text.trim();
    bare_number(text).or_else(|| scan_last(&PROTEIN_PATTERNS, text))
}

pub fn extract_fat(text: &str) -> Option<f64> {
    let text = text.trim();
    bare_number(text).or_else(|| scan_last(&FAT_PATTERNS, text))
}

pub fn extract_carbs(text: &str) -> Option<f64> {
    let text = text.trim();
    bare_number(text).or_else(|| scan_last(&CARBS_PATTERNS, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_total_beats_bare_mentions() {
        let text = "Курица 120 ккал, рис 180 ккал. Итого: 450 ккал";
        assert_eq!(extract_calories(text), Some(450.0));
    }

    #[test]
    fn last_match_wins_within_a_pattern() {
        // Two bare unit mentions: the later one is the summed total.
        let text = "Сначала 120 ккал, после добавки получилось 450 ккал";
        assert_eq!(extract_calories(text), Some(450.0));
    }

    #[test]
    fn bare_number_is_the_value() {
        assert_eq!(extract_calories("  320  "), Some(320.0));
        assert_eq!(extract_protein("27,5"), Some(27.5));
    }

    #[test]
    fn fallback_skips_serving_counts() {
        // "2" is a serving count; 350 is the only plausible calorie figure.
        assert_eq!(extract_calories("2 яйца и каша, примерно-ничего, 350"), Some(350.0));
    }

    #[test]
    fn absence_is_none() {
        assert_eq!(extract_calories(""), None);
        assert_eq!(extract_protein("вкусный обед"), None);
        assert_eq!(extract_fat("вкусный обед"), None);
        assert_eq!(extract_carbs("вкусный обед"), None);
    }

    #[test]
    fn decimal_comma_accepted() {
        assert_eq!(extract_protein("32,5 г белка"), Some(32.5));
        assert_eq!(extract_fat("жиры: 26.4"), Some(26.4));
    }

    #[test]
    fn abbreviated_single_letter_labels() {
        let text = "б: 35г, ж: 16г, у: 45г";
        assert_eq!(extract_protein(text), Some(35.0));
        assert_eq!(extract_fat(text), Some(16.0));
        assert_eq!(extract_carbs(text), Some(45.0));
    }

    #[test]
    fn gram_word_variants() {
        assert_eq!(extract_protein("25 грамм белка"), Some(25.0));
        assert_eq!(extract_fat("жирность 10 грамм"), Some(10.0));
        assert_eq!(extract_carbs("углеводов 20 грамм"), Some(20.0));
    }
}
