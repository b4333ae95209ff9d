//! Meal Nutrition Analyzer — Binary Entrypoint
//! Reads a meal description from the arguments (or stdin), runs it through
//! the extraction/validation pipeline, and prints the result as JSON.

use std::io::Read;

use anyhow::Context;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use meal_nutrition_analyzer::{analyze_meal, MealAnalysis, ValidatorConfig};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading meal description from stdin")?;
        buf
    } else {
        args.join(" ")
    };

    let cfg = ValidatorConfig::from_env();
    let output = match analyze_meal(text.trim(), &cfg) {
        MealAnalysis::Manual { name, calories } => json!({
            "kind": "manual",
            "name": name,
            "calories": calories,
        }),
        MealAnalysis::Estimated { facts, warnings } => json!({
            "kind": "estimated",
            "facts": facts,
            "corrections": warnings,
        }),
        MealAnalysis::Unrecognized => json!({ "kind": "unrecognized" }),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
