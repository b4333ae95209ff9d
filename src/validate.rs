//! Nutrition validator/corrector: the quality gate between extraction and
//! persistence.
//!
//! Takes the extracted quadruple plus the dish description, cross-checks the
//! macro-to-calorie arithmetic and the ingredient-to-calorie plausibility,
//! and returns a corrected copy. Rules run in a fixed order; a later, more
//! specific rule may overwrite what an earlier one set. Corrections only
//! raise values, except the two explicit ceiling clamps (meat protein above
//! 60g, low-calorie staple above 500 kcal).
//!
//! Every adjustment is recorded as a warning and logged with the field, old
//! value, new value and triggering rule, so a systematic estimator bias can
//! be read off the logs. Warnings are for operators and tests, never shown
//! verbatim to end users.

use serde::Serialize;
use tracing::warn;

use crate::config::ValidatorConfig;
use crate::ingredients::{self, DishSignals};
use crate::nutrition::NutritionFacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    MacroConsistency,
    IngredientFloor,
    ProteinRange,
    StapleRange,
    Salad,
    CompositeDish,
    LeanMacroRepair,
    AbsoluteFloor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Calories,
    Protein,
    Fat,
    Carbs,
}

/// One applied (or flagged) correction. Log-only; not user-facing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub rule: Rule,
    pub field: Field,
    /// `None` when the field was absent before the correction.
    pub old: Option<f64>,
    pub new: f64,
}

/// Validation result: a corrected copy plus the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub facts: NutritionFacts,
    pub warnings: Vec<Warning>,
}

struct Corrector<'a> {
    facts: NutritionFacts,
    warnings: Vec<Warning>,
    description: &'a str,
}

impl<'a> Corrector<'a> {
    fn new(facts: &NutritionFacts, description: &'a str) -> Self {
        Self {
            facts: facts.clone(),
            warnings: Vec::new(),
            description,
        }
    }

    fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Calories => self.facts.calories,
            Field::Protein => self.facts.protein_g,
            Field::Fat => self.facts.fat_g,
            Field::Carbs => self.facts.carbs_g,
        }
    }

    fn set(&mut self, rule: Rule, field: Field, new: f64) {
        let old = self.get(field);
        if old == Some(new) {
            return;
        }
        warn!(
            ?rule,
            ?field,
            old = ?old,
            new,
            description = self.description,
            "nutrition value corrected"
        );
        self.warnings.push(Warning {
            rule,
            field,
            old,
            new,
        });
        match field {
            Field::Calories => self.facts.calories = Some(new),
            Field::Protein => self.facts.protein_g = Some(new),
            Field::Fat => self.facts.fat_g = Some(new),
            Field::Carbs => self.facts.carbs_g = Some(new),
        }
    }

    /// Raise `field` to `min` if it is currently below it (or absent).
    fn floor(&mut self, rule: Rule, field: Field, min: f64) {
        match self.get(field) {
            Some(v) if v >= min => {}
            _ => self.set(rule, field, min),
        }
    }
}

/// Validate and correct one extracted quadruple against its dish description.
/// The input is never mutated; the returned copy carries the corrections.
pub fn validate_nutrition(
    facts: &NutritionFacts,
    description: &str,
    cfg: &ValidatorConfig,
) -> Validated {
    let sig = ingredients::signals(description);
    let mut c = Corrector::new(facts, description);

    check_macro_consistency(&mut c, cfg);
    apply_ingredient_floor(&mut c, &sig, cfg);
    apply_protein_range(&mut c, &sig, cfg);
    apply_staple_range(&mut c, &sig, cfg);
    apply_salad_rules(&mut c, &sig, cfg);
    apply_composite_floors(&mut c, &sig, cfg);
    repair_lean_macros(&mut c, &sig, cfg);
    apply_absolute_floors(&mut c, cfg);

    Validated {
        facts: c.facts,
        warnings: c.warnings,
    }
}

/// Rule 1: macro/calorie consistency. Upstream estimators are better at
/// per-ingredient macro breakdowns than at the summed calorie figure, so on
/// strong disagreement the macro-implied value wins.
fn check_macro_consistency(c: &mut Corrector, cfg: &ValidatorConfig) {
    let (Some(cal), Some(implied)) = (c.facts.calories, c.facts.implied_calories()) else {
        return;
    };
    if implied <= 0.0 {
        return;
    }
    let deviation = (cal - implied).abs() / implied;
    if deviation > cfg.deviation_replace {
        c.set(Rule::MacroConsistency, Field::Calories, implied);
    } else if deviation > cfg.deviation_warn {
        // Borderline disagreement: split the difference.
        c.set(Rule::MacroConsistency, Field::Calories, (cal + implied) / 2.0);
    }
}

/// Rule 2: ingredient-count floor. Multi-ingredient dishes have a realistic
/// calorie minimum regardless of what the estimator claimed.
fn apply_ingredient_floor(c: &mut Corrector, sig: &DishSignals, cfg: &ValidatorConfig) {
    let Some(cal) = c.facts.calories else { return };
    let count = sig.ingredients.len();

    if count >= 3 && cal < cfg.multi_ingredient_floor {
        let floor = if sig.has_meat && sig.has_starch {
            cfg.meat_plus_starch_floor
        } else {
            cfg.multi_ingredient_floor
        };
        c.set(Rule::IngredientFloor, Field::Calories, floor);
    } else if count == 2 && cal < cfg.two_ingredient_floor {
        let proposed = cfg.two_ingredient_floor.max(sig.portion_estimate);
        // Only correct when clearly off; near-correct values are left alone.
        if proposed >= cal * cfg.churn_guard_ratio {
            c.set(Rule::IngredientFloor, Field::Calories, proposed);
        }
    }
}

/// Rule 3: protein plausibility for dishes with a meat/poultry/fish source.
fn apply_protein_range(c: &mut Corrector, sig: &DishSignals, cfg: &ValidatorConfig) {
    if !sig.has_meat {
        return;
    }
    match c.facts.protein_g {
        None => c.set(Rule::ProteinRange, Field::Protein, cfg.meat_protein_default),
        Some(p) if p < cfg.meat_protein_min => {
            // Lower bound keeps the scaled value out of the trigger band so a
            // second pass cannot re-fire this rule.
            let scaled =
                (p * cfg.meat_protein_scale).clamp(cfg.meat_protein_min, cfg.meat_protein_cap);
            c.set(Rule::ProteinRange, Field::Protein, scaled);
        }
        Some(p) if p > cfg.meat_protein_max => {
            c.set(Rule::ProteinRange, Field::Protein, cfg.meat_protein_cap);
        }
        Some(_) => {}
    }
}

/// Rule 4: known-staple sanity checks. The low-calorie ceiling clamps first;
/// a later composite floor may still raise the result back up.
fn apply_staple_range(c: &mut Corrector, sig: &DishSignals, cfg: &ValidatorConfig) {
    if let Some(cal) = c.facts.calories {
        if sig.has_low_cal && cal > cfg.low_cal_ceiling_trigger {
            c.set(Rule::StapleRange, Field::Calories, cfg.low_cal_ceiling);
        }
    }
    if let Some(cal) = c.facts.calories {
        if sig.has_high_cal && cal < cfg.high_cal_floor_trigger {
            c.set(Rule::StapleRange, Field::Calories, cfg.high_cal_floor);
        }
    }
    if let Some(cal) = c.facts.calories {
        if sig.has_very_high_cal && cal < cfg.very_high_cal_trigger {
            c.set(Rule::StapleRange, Field::Calories, cfg.very_high_cal_floor);
        }
    }
}

/// Rule 5: salad-specific floors keyed on dressing/cheese signals.
fn apply_salad_rules(c: &mut Corrector, sig: &DishSignals, cfg: &ValidatorConfig) {
    if !sig.has_salad {
        return;
    }
    if sig.has_cheese && sig.has_dressing {
        c.floor(Rule::Salad, Field::Calories, cfg.salad_cheese_dressing_floor);
        c.floor(Rule::Salad, Field::Fat, cfg.salad_cheese_dressing_fat_min);
    } else if sig.has_dressing {
        c.floor(Rule::Salad, Field::Calories, cfg.salad_dressing_floor);
        if sig.has_mayo {
            c.floor(Rule::Salad, Field::Fat, cfg.salad_mayo_fat_min);
        }
    } else {
        c.floor(Rule::Salad, Field::Calories, cfg.salad_plain_floor);
    }
}

/// Rule 6: composite-dish floors.
fn apply_composite_floors(c: &mut Corrector, sig: &DishSignals, cfg: &ValidatorConfig) {
    if sig.has_starch && sig.has_meat && c.facts.calories.is_some() {
        c.floor(Rule::CompositeDish, Field::Calories, cfg.starch_meat_floor);
    }
    if sig.has_korean_carrot {
        // Oil-heavy preparation; near-lean fat values are not credible.
        match c.facts.fat_g {
            Some(f) if f >= cfg.korean_carrot_fat_trigger => {}
            _ => c.set(Rule::CompositeDish, Field::Fat, cfg.korean_carrot_fat_min),
        }
    }
}

/// Rule 7: zero/near-zero macro repair for clearly composite dishes.
fn repair_lean_macros(c: &mut Corrector, sig: &DishSignals, cfg: &ValidatorConfig) {
    if sig.ingredients.len() < 2 && !sig.has_meat {
        return;
    }
    if let Some(f) = c.facts.fat_g {
        if f <= cfg.lean_fat_trigger {
            let min = if sig.has_egg && sig.has_meat {
                cfg.lean_fat_min_egg_meat
            } else {
                cfg.lean_fat_min
            };
            c.set(Rule::LeanMacroRepair, Field::Fat, min);
        }
    }
    if sig.has_starch {
        if let Some(carbs) = c.facts.carbs_g {
            if carbs <= cfg.starch_carbs_trigger {
                c.set(Rule::LeanMacroRepair, Field::Carbs, cfg.starch_carbs_min);
            }
        }
    }
}

/// Rule 8: present-but-near-zero values are rounding artifacts, not zeros.
fn apply_absolute_floors(c: &mut Corrector, cfg: &ValidatorConfig) {
    if let Some(p) = c.facts.protein_g {
        if p < cfg.protein_floor {
            c.set(Rule::AbsoluteFloor, Field::Protein, cfg.protein_floor);
        }
    }
    if let Some(f) = c.facts.fat_g {
        if f < cfg.fat_floor {
            c.set(Rule::AbsoluteFloor, Field::Fat, cfg.fat_floor);
        }
    }
    if let Some(cb) = c.facts.carbs_g {
        if cb < cfg.carbs_floor {
            c.set(Rule::AbsoluteFloor, Field::Carbs, cfg.carbs_floor);
        }
    }
}
