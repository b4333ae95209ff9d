//! Validator contract suite: the hand-picked regression dishes plus an
//! idempotence sweep over synthetic quadruples.

use meal_nutrition_analyzer::validate::{validate_nutrition, Field, Rule};
use meal_nutrition_analyzer::{NutritionFacts, ValidatorConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cfg() -> ValidatorConfig {
    ValidatorConfig::default()
}

fn facts(cal: f64, p: f64, f: f64, cb: f64) -> NutritionFacts {
    NutritionFacts::calories_only(cal)
        .with_protein(p)
        .with_fat(f)
        .with_carbs(cb)
}

#[test]
fn understated_calories_replaced_by_macro_arithmetic() {
    // The macros imply 484 kcal; the reported 159 is off by far more than
    // the replacement threshold.
    let v = validate_nutrition(&facts(159.0, 32.5, 26.4, 29.2), "творог с бананом", &cfg());
    assert!(v.facts.calories.unwrap() > 400.0);
    assert_eq!(v.facts.protein_g, Some(32.5));
    assert_eq!(v.facts.fat_g, Some(26.4));
}

#[test]
fn oily_tuna_salad_settles_at_the_composite_floor() {
    // Macro arithmetic first lifts the reported 300 kcal, the low-cal staple
    // ceiling clamps it, and the starch+meat floor decides the final value.
    let description = "Салат с тунцом: консервированный тунец в масле, огурцы, \
                       сухарики, вареное яйцо, майонез";
    let v = validate_nutrition(&facts(300.0, 31.9, 38.9, 18.0), description, &cfg());
    assert_eq!(v.facts.calories, Some(450.0));
    assert_eq!(v.facts.protein_g, Some(31.9));
}

#[test]
fn low_cal_ceiling_is_unconditional() {
    let v = validate_nutrition(&NutritionFacts::calories_only(800.0), "тунец с огурцами", &cfg());
    assert_eq!(v.facts.calories, Some(300.0));
}

#[test]
fn consistent_estimate_is_untouched() {
    let input = facts(450.0, 31.5, 23.8, 31.5);
    let v = validate_nutrition(&input, "Творог с бананом", &cfg());
    assert_eq!(v.facts, input);
    assert!(v.warnings.is_empty());
}

#[test]
fn four_ingredient_meat_dish_gets_composite_floor() {
    let v = validate_nutrition(
        &NutritionFacts::calories_only(186.0),
        "курица, рис, яйцо, огурцы",
        &cfg(),
    );
    assert!(v.facts.calories.unwrap() >= 420.0);
    // Meat dish with no stated protein: filled with the default serving.
    assert_eq!(v.facts.protein_g, Some(28.0));
}

#[test]
fn cheese_and_dressing_salad_floors() {
    let input = NutritionFacts::calories_only(150.0).with_fat(10.0);
    let v = validate_nutrition(&input, "греческий салат с сыром фета и майонезом", &cfg());
    assert!(v.facts.calories.unwrap() >= 350.0);
    assert!(v.facts.fat_g.unwrap() >= 15.0);
}

#[test]
fn corrections_are_reported_per_field() {
    let v = validate_nutrition(&facts(159.0, 32.5, 26.4, 29.2), "творог с бананом", &cfg());
    assert!(v
        .warnings
        .iter()
        .any(|w| w.rule == Rule::MacroConsistency && w.field == Field::Calories));
    assert!(v.warnings.iter().all(|w| w.field != Field::Protein));
}

#[test]
fn regression_dishes_validate_to_a_fixed_point() {
    let dishes = [
        (facts(159.0, 32.5, 26.4, 29.2), "творог с бананом"),
        (
            facts(300.0, 31.9, 38.9, 18.0),
            "Салат с тунцом: консервированный тунец в масле, огурцы, сухарики, вареное яйцо, майонез",
        ),
        (facts(450.0, 31.5, 23.8, 31.5), "Творог с бананом"),
        (NutritionFacts::calories_only(186.0), "курица, рис, яйцо, огурцы"),
        (
            NutritionFacts::calories_only(150.0).with_fat(10.0),
            "греческий салат с сыром фета и майонезом",
        ),
        (NutritionFacts::calories_only(700.0), "огурцы с зеленью"),
        (NutritionFacts::calories_only(800.0), "тунец с огурцами"),
        (NutritionFacts::calories_only(180.0), "тост с арахисовой пастой"),
        (NutritionFacts::calories_only(380.0), "макароны с котлетой"),
        (
            NutritionFacts::calories_only(200.0).with_fat(3.0),
            "морковь по-корейски",
        ),
    ];
    for (input, description) in dishes {
        let once = validate_nutrition(&input, description, &cfg());
        let twice = validate_nutrition(&once.facts, description, &cfg());
        assert_eq!(once.facts, twice.facts, "not a fixed point: {description}");
        assert!(twice.warnings.is_empty(), "rerun corrected again: {description}");
    }
}

#[test]
fn synthetic_quadruples_validate_to_a_fixed_point() {
    // Neutral descriptions keep ingredient rules out; this sweeps the
    // macro-consistency and floor logic across the whole numeric range.
    let mut rng = StdRng::seed_from_u64(42);
    for i in 0..500 {
        let input = facts(
            rng.random_range(50.0..1200.0),
            rng.random_range(1.0..60.0),
            rng.random_range(1.0..60.0),
            rng.random_range(1.0..120.0),
        );
        let description = format!("обед номер {i}");
        let once = validate_nutrition(&input, &description, &cfg());
        let twice = validate_nutrition(&once.facts, &description, &cfg());
        assert_eq!(once.facts, twice.facts, "not a fixed point for {input:?}");
    }
}

#[test]
fn validation_never_drops_fields() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let input = facts(
            rng.random_range(1.0..2000.0),
            rng.random_range(0.0..80.0),
            rng.random_range(0.0..80.0),
            rng.random_range(0.0..150.0),
        );
        let v = validate_nutrition(&input, "курица с рисом и овощным салатом", &cfg());
        assert!(v.facts.calories.is_some());
        assert!(v.facts.protein_g.is_some());
        assert!(v.facts.fat_g.is_some());
        assert!(v.facts.carbs_g.is_some());
    }
}
