//! Dish description cleanup: turn a full nutrition narrative into the short
//! human-readable dish name stored in the meal log.
//!
//! Upstream narratives interleave the dish description with tally lines,
//! per-ingredient bullet breakdowns and bare calorie figures. Those all get
//! stripped; what remains is the prose that actually names the dish.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback when stripping leaves nothing usable.
const PHOTO_FALLBACK: &str = "Блюдо с фото";
const MIN_DESCRIPTION_CHARS: usize = 5;

static STRIPPERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Tally line and everything after it.
        r"(?is)\s*\.?\s*итого:.*$",
        // A calorie figure and the rest of the text.
        r"(?s)\s*\d+\s*ккал.*$",
        // Trailing bare number.
        r"\s*\d+\s*$",
        // Bullet breakdown starting on its own line.
        r"(?s)\n\s*-.*$",
        // Bullet breakdown glued to the last sentence.
        r"(?s)\.\s*-.*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid description stripper"))
    .collect()
});

static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").expect("newline pattern"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").expect("space run pattern"));

/// Short dish description from a narrative. Never empty.
pub fn extract_description(narrative: &str) -> String {
    let mut text = narrative.to_owned();
    for re in STRIPPERS.iter() {
        text = re.replace(&text, "").into_owned();
    }
    let text = NEWLINES.replace_all(&text, " ");
    let text = SPACES.replace_all(&text, " ");
    let text = text.trim().trim_end_matches(['.', ',', ':']).trim();

    if text.chars().count() < MIN_DESCRIPTION_CHARS {
        PHOTO_FALLBACK.to_owned()
    } else {
        text.to_owned()
    }
}
