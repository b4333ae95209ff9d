//! nutrition.rs — the central value type shared by the extraction and
//! validation stages.
//!
//! A `NutritionFacts` is created fresh for every parse attempt and never
//! mutated in place: the validator returns a corrected copy so the original
//! stays available for audit logging.

use serde::{Deserialize, Serialize};

/// Energy per gram of protein and carbohydrate (kcal).
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
/// Energy per gram of fat (kcal).
pub const KCAL_PER_G_FAT: f64 = 9.0;
/// Energy per gram of carbohydrate (kcal).
pub const KCAL_PER_G_CARBS: f64 = 4.0;

/// One meal's estimated nutrition. Absent fields mean "unknown", never zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
}

impl NutritionFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calories-only facts (the minimum useful extraction result).
    pub fn calories_only(kcal: f64) -> Self {
        Self {
            calories: Some(kcal),
            ..Self::default()
        }
    }

    pub fn with_protein(mut self, g: f64) -> Self {
        self.protein_g = Some(g);
        self
    }

    pub fn with_fat(mut self, g: f64) -> Self {
        self.fat_g = Some(g);
        self
    }

    pub fn with_carbs(mut self, g: f64) -> Self {
        self.carbs_g = Some(g);
        self
    }

    /// True when no field at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein_g.is_none()
            && self.fat_g.is_none()
            && self.carbs_g.is_none()
    }

    /// Calories implied by the macros via the 4/9/4 kcal-per-gram rule.
    /// `None` unless all three macros are present.
    pub fn implied_calories(&self) -> Option<f64> {
        match (self.protein_g, self.fat_g, self.carbs_g) {
            (Some(p), Some(f), Some(c)) => {
                Some(p * KCAL_PER_G_PROTEIN + f * KCAL_PER_G_FAT + c * KCAL_PER_G_CARBS)
            }
            _ => None,
        }
    }

    /// Output shape handed to the persistence layer: calories to an integer,
    /// macros to one decimal place.
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.map(|v| v.round()),
            protein_g: self.protein_g.map(round1),
            fat_g: self.fat_g.map(round1),
            carbs_g: self.carbs_g.map(round1),
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
