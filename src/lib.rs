// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod budget;
pub mod config;
pub mod describe;
pub mod extract;
pub mod manual;
pub mod narrative;
pub mod nutrition;
pub mod pipeline;
pub mod storage;
pub mod validate;

// Ingredient detection is an implementation detail of the validator; dish
// signals are not a stable public surface.
mod ingredients;

// ---- Re-exports for stable public API ----
pub use crate::config::ValidatorConfig;
pub use crate::extract::extract_nutrition;
pub use crate::nutrition::NutritionFacts;
pub use crate::pipeline::{analyze_meal, analyze_narrative, MealAnalysis};
pub use crate::validate::validate_nutrition;
