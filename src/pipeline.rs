//! End-to-end meal analysis: manual-override check, extraction, validation.
//!
//! Two entry points. `analyze_meal` handles a raw user message: a manual
//! override short-circuits everything, otherwise the message itself is the
//! narrative. `analyze_narrative` handles an upstream reply where the dish
//! description has already been separated from the nutrition text.
//!
//! Log lines carry a short hash of the input instead of the text itself, so
//! meal contents never land in logs.

use tracing::info;

use crate::config::ValidatorConfig;
use crate::extract::extract_nutrition;
use crate::manual::parse_manual_calories;
use crate::nutrition::NutritionFacts;
use crate::validate::{validate_nutrition, Warning};

/// Anonymized input reference for log lines: the first 6 bytes of a
/// SHA-256 digest, hex-encoded.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}

/// Outcome of analyzing one meal message or narrative.
#[derive(Debug, Clone, PartialEq)]
pub enum MealAnalysis {
    /// User stated the calories directly; trusted as-is, not validated.
    Manual { name: String, calories: i64 },
    /// Extracted and corrected facts, with the correction audit trail.
    Estimated {
        facts: NutritionFacts,
        warnings: Vec<Warning>,
    },
    /// No calorie figure anywhere; the caller should ask for a better input.
    Unrecognized,
}

/// Analyze a raw user message.
pub fn analyze_meal(text: &str, cfg: &ValidatorConfig) -> MealAnalysis {
    if let Some(entry) = parse_manual_calories(text) {
        info!(
            input = %anon_hash(text),
            calories = entry.calories,
            "manual calorie override"
        );
        return MealAnalysis::Manual {
            name: entry.name,
            calories: entry.calories,
        };
    }
    analyze_narrative(text, text, cfg)
}

/// Analyze a nutrition narrative against its dish description.
///
/// `description` drives ingredient detection; `narrative` drives extraction.
/// For plain text messages they are the same string.
pub fn analyze_narrative(narrative: &str, description: &str, cfg: &ValidatorConfig) -> MealAnalysis {
    let extracted = extract_nutrition(narrative);
    if extracted.calories.is_none() {
        info!(input = %anon_hash(narrative), "no calorie figure extracted");
        return MealAnalysis::Unrecognized;
    }

    let validated = validate_nutrition(&extracted, description, cfg);
    info!(
        input = %anon_hash(narrative),
        calories = validated.facts.calories,
        corrections = validated.warnings.len(),
        "meal analyzed"
    );
    MealAnalysis::Estimated {
        facts: validated.facts.rounded(),
        warnings: validated.warnings,
    }
}
