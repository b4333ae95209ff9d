//! Nutrition aggregator: one `NutritionFacts` per narrative text.
//!
//! Preference order is "where do the numbers come from", strongest first:
//! 1. a combined four-value pattern inside the final tally section,
//! 2. the independent field extractors scoped to the tally section,
//! 3. the combined pattern over the whole text (last occurrence wins),
//! 4. the independent field extractors over the whole text.
//!
//! A tally-scoped read guarantees all four values come from the same reported
//! total instead of being independently mismatched from different lines.

pub mod patterns;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::nutrition::NutritionFacts;
pub use patterns::{extract_calories, extract_carbs, extract_fat, extract_protein};

// Case-insensitive anchors that open a final tally section.
static SUMMARY_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)итого|всего|общая\s+калорийность").expect("summary anchor pattern")
});

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("blank line pattern"));

// All four values in order, each followed by its unit/label:
// "450 ккал, 30 г белка, 15 г жиров, 25 г углеводов".
static COMBINED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d+)\s*ккал\D*?(\d+(?:[.,]\d+)?)\s*(?:грамм[а-яё]*|гр|г)\.?\s*белк[а-яё]*\D*?(\d+(?:[.,]\d+)?)\s*(?:грамм[а-яё]*|гр|г)\.?\s*жир[а-яё]*\D*?(\d+(?:[.,]\d+)?)\s*(?:грамм[а-яё]*|гр|г)\.?\s*углевод[а-яё]*",
    )
    .expect("combined nutrition pattern")
});

/// The text from the LAST summary anchor to the next blank line or the end.
/// Per-ingredient breakdowns precede the tally, so the last anchor is the one
/// that opens the true total.
fn summary_section(text: &str) -> Option<&str> {
    let start = SUMMARY_ANCHOR.find_iter(text).last()?.start();
    let tail = &text[start..];
    let end = BLANK_LINE.find(tail).map(|m| m.start()).unwrap_or(tail.len());
    Some(&tail[..end])
}

/// Last occurrence of the combined four-value pattern in `text`.
fn combined_quadruple(text: &str) -> Option<NutritionFacts> {
    let caps = COMBINED.captures_iter(text).last()?;
    let num = |i: usize| caps.get(i).and_then(|m| patterns::parse_number(m.as_str()));
    Some(NutritionFacts {
        calories: num(1).map(f64::trunc),
        protein_g: num(2),
        fat_g: num(3),
        carbs_g: num(4),
    })
}

/// Run the four independent extractors over one string.
fn extract_fields(text: &str) -> NutritionFacts {
    NutritionFacts {
        calories: extract_calories(text),
        protein_g: extract_protein(text),
        fat_g: extract_fat(text),
        carbs_g: extract_carbs(text),
    }
}

/// Produce one `NutritionFacts` from the full narrative text.
///
/// Partial results are valid: calories-only is a legitimate output, and a
/// fully empty result means the caller should ask for a better description.
pub fn extract_nutrition(text: &str) -> NutritionFacts {
    if let Some(section) = summary_section(text) {
        if let Some(facts) = combined_quadruple(section) {
            debug!("extracted combined quadruple from tally section");
            return facts;
        }
        // The section still pins down the calorie total even when the
        // combined shape does not hold; scope every field to it.
        if extract_calories(section).is_some() {
            debug!("extracted per-field values from tally section");
            return extract_fields(section);
        }
    }

    if let Some(facts) = combined_quadruple(text) {
        debug!("extracted combined quadruple from whole text");
        return facts;
    }

    extract_fields(text)
}
