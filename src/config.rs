//! Tunable thresholds for the nutrition validator.
//!
//! Every constant here is a hand-tuned match for one upstream estimator's
//! empirically observed bias, not nutritional ground truth. They are kept as
//! configurable values (TOML file, env-selected path) so a recalibration does
//! not touch the rule code.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_VALIDATOR_CONFIG_PATH: &str = "config/validator.toml";
pub const ENV_VALIDATOR_CONFIG_PATH: &str = "VALIDATOR_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Relative macro/calorie deviation that triggers a warning.
    pub deviation_warn: f64,
    /// Relative deviation above which reported calories are replaced outright.
    pub deviation_replace: f64,

    /// Floor for dishes with 3+ detected ingredients.
    pub multi_ingredient_floor: f64,
    /// Floor when a meat protein and a starch side are both present.
    pub meat_plus_starch_floor: f64,
    /// Floor considered for dishes with exactly 2 detected ingredients.
    pub two_ingredient_floor: f64,
    /// A two-ingredient correction is applied only when the proposed value is
    /// at least this multiple of the current one (avoids churn).
    pub churn_guard_ratio: f64,

    /// Meat-dish protein plausibility band.
    pub meat_protein_min: f64,
    pub meat_protein_scale: f64,
    pub meat_protein_cap: f64,
    pub meat_protein_default: f64,
    pub meat_protein_max: f64,

    /// Staple sanity checks.
    pub low_cal_ceiling_trigger: f64,
    pub low_cal_ceiling: f64,
    pub high_cal_floor_trigger: f64,
    pub high_cal_floor: f64,
    pub very_high_cal_trigger: f64,
    pub very_high_cal_floor: f64,

    /// Salad corrections.
    pub salad_cheese_dressing_floor: f64,
    pub salad_cheese_dressing_fat_min: f64,
    pub salad_dressing_floor: f64,
    pub salad_mayo_fat_min: f64,
    pub salad_plain_floor: f64,

    /// Composite-dish floors.
    pub starch_meat_floor: f64,
    pub korean_carrot_fat_trigger: f64,
    pub korean_carrot_fat_min: f64,

    /// Near-zero macro repair.
    pub lean_fat_trigger: f64,
    pub lean_fat_min_egg_meat: f64,
    pub lean_fat_min: f64,
    pub starch_carbs_trigger: f64,
    pub starch_carbs_min: f64,

    /// Absolute floors for present macro values.
    pub protein_floor: f64,
    pub fat_floor: f64,
    pub carbs_floor: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            deviation_warn: 0.3,
            deviation_replace: 0.4,

            multi_ingredient_floor: 400.0,
            meat_plus_starch_floor: 420.0,
            two_ingredient_floor: 320.0,
            churn_guard_ratio: 1.15,

            meat_protein_min: 20.0,
            meat_protein_scale: 2.5,
            meat_protein_cap: 45.0,
            meat_protein_default: 28.0,
            meat_protein_max: 60.0,

            low_cal_ceiling_trigger: 500.0,
            low_cal_ceiling: 300.0,
            high_cal_floor_trigger: 200.0,
            high_cal_floor: 250.0,
            very_high_cal_trigger: 300.0,
            very_high_cal_floor: 350.0,

            salad_cheese_dressing_floor: 350.0,
            salad_cheese_dressing_fat_min: 18.0,
            salad_dressing_floor: 280.0,
            salad_mayo_fat_min: 20.0,
            salad_plain_floor: 120.0,

            starch_meat_floor: 450.0,
            korean_carrot_fat_trigger: 8.0,
            korean_carrot_fat_min: 10.0,

            lean_fat_trigger: 1.0,
            lean_fat_min_egg_meat: 8.0,
            lean_fat_min: 4.0,
            starch_carbs_trigger: 5.0,
            starch_carbs_min: 20.0,

            protein_floor: 0.5,
            fat_floor: 0.1,
            carbs_floor: 0.5,
        }
    }
}

impl ValidatorConfig {
    /// Load from a TOML file; missing keys fall back to the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve the config path from `VALIDATOR_CONFIG_PATH` (defaulting to
    /// `config/validator.toml`) and load it; any failure falls back to the
    /// built-in defaults with a warning.
    pub fn from_env() -> Self {
        let path = std::env::var(ENV_VALIDATOR_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_VALIDATOR_CONFIG_PATH));
        match Self::load_from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "validator config unreadable, using defaults");
                }
                Self::default()
            }
        }
    }
}
