//! Daily energy budget from a user profile: Mifflin-St Jeor BMR, a fixed
//! light-activity multiplier, and a goal multiplier on top.
//!
//! All three outputs are truncated to whole kcal, stage by stage: the TDEE
//! is cut to an integer before the goal multiplier applies, so the target
//! matches the figures users have already seen logged.

use serde::{Deserialize, Serialize};

/// Fixed activity factor ("light activity"); per-user activity levels are
/// deliberately not modeled.
pub const ACTIVITY_MULTIPLIER: f64 = 1.375;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Deficit,
    Maintain,
    Surplus,
}

impl Goal {
    pub fn multiplier(self) -> f64 {
        match self {
            Goal::Deficit => 0.8,
            Goal::Maintain => 1.0,
            Goal::Surplus => 1.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyBudget {
    /// Basal metabolic rate, kcal/day.
    pub bmr: i64,
    /// BMR scaled by the activity multiplier.
    pub tdee: i64,
    /// TDEE scaled by the goal multiplier; the daily target shown to users.
    pub target: i64,
}

/// Mifflin-St Jeor with the fixed activity factor and the goal multiplier.
pub fn calculate_budget(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    sex: Sex,
    goal: Goal,
) -> EnergyBudget {
    let sex_term = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64 + sex_term;
    let tdee = (bmr * ACTIVITY_MULTIPLIER) as i64;
    let target = (tdee as f64 * goal.multiplier()) as i64;
    EnergyBudget {
        bmr: bmr as i64,
        tdee,
        target,
    }
}
