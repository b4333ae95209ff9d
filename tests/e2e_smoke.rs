//! End-to-end smoke: mock narrative provider -> reply classification ->
//! description cleanup -> extraction/validation -> meal log.

use chrono::NaiveDate;
use meal_nutrition_analyzer::describe::extract_description;
use meal_nutrition_analyzer::narrative::{
    classify_reply, fetch_with_retry, MockNarrativeSource, NarrativeReply, NarrativeRequest,
    RetryPolicy,
};
use meal_nutrition_analyzer::storage::{FoodLogEntry, UserStore};
use meal_nutrition_analyzer::{analyze_narrative, MealAnalysis, ValidatorConfig};

#[tokio::test]
async fn photo_narrative_to_logged_meal() {
    let source = MockNarrativeSource {
        fixed: "Творог с бананом и мёдом.\n\
                Итого: 159 ккал, 32,5 г белка, 26,4 г жиров, 29,2 г углеводов"
            .into(),
    };
    let request = NarrativeRequest::Photo {
        base64_jpeg: "ZmFrZQ==".into(),
    };
    let raw = fetch_with_retry(&source, &request, RetryPolicy::default())
        .await
        .unwrap();

    let NarrativeReply::Narrative(narrative) = classify_reply(&raw) else {
        panic!("expected a narrative");
    };

    let description = extract_description(&narrative);
    assert_eq!(description, "Творог с бананом и мёдом");

    let cfg = ValidatorConfig::default();
    let MealAnalysis::Estimated { facts, warnings } =
        analyze_narrative(&narrative, &description, &cfg)
    else {
        panic!("expected an estimate");
    };
    // The understated calorie total is repaired from the macros.
    assert!(facts.calories.unwrap() > 400.0);
    assert!(!warnings.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::new(dir.path());
    let day: NaiveDate = "2026-08-24".parse().unwrap();
    store
        .log_meal(
            1,
            day,
            FoodLogEntry {
                description,
                calories: facts.calories.unwrap() as i64,
                protein_g: facts.protein_g,
                fat_g: facts.fat_g,
                carbs_g: facts.carbs_g,
            },
        )
        .unwrap();

    let total = store.day_total(1, day).unwrap();
    assert_eq!(total.entries, 1);
    assert!(total.calories > 400);
    assert_eq!(total.protein_g, Some(32.5));
}

#[tokio::test]
async fn clarifying_question_is_not_logged() {
    let source = MockNarrativeSource {
        fixed: "Вижу кашу. ВОПРОС: какой объём порции?".into(),
    };
    let request = NarrativeRequest::Text("каша".into());
    let raw = fetch_with_retry(&source, &request, RetryPolicy::default())
        .await
        .unwrap();
    assert!(matches!(classify_reply(&raw), NarrativeReply::Question(_)));
}

#[tokio::test]
async fn refusal_is_surfaced_not_extracted() {
    let source = MockNarrativeSource {
        fixed: "Извините, на этом фото нет еды.".into(),
    };
    let request = NarrativeRequest::Photo {
        base64_jpeg: "ZmFrZQ==".into(),
    };
    let raw = fetch_with_retry(&source, &request, RetryPolicy::default())
        .await
        .unwrap();
    assert!(matches!(classify_reply(&raw), NarrativeReply::Refusal(_)));
}
