//! Ingredient detector: a stateless keyword/regex scan over a lowercased dish
//! description. Stems are matched with a wildcard suffix because domain text
//! is declined by grammatical case ("курицей", "огурцами"); a few entries use
//! explicit endings where the bare stem collides with unrelated words
//! ("масло" vs "маслины", "сыр" vs "сырой").
//!
//! Compound ingredients ("арахисовая паста", "морковь по-корейски") are a
//! single combined category distinct from their component words: when a
//! compound is present, its component tokens are stripped before the
//! single-ingredient scan so they are not double-counted.
//!
//! Used by the validator only; not part of the public crate surface.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    Meat,
    Egg,
    Starch,
    Dairy,
    Cheese,
    Vegetable,
    Fruit,
    Dressing,
    Oil,
    Nuts,
    NutPaste,
    KoreanCarrot,
}

struct IngredientDef {
    name: &'static str,
    class: Class,
    pattern: &'static str,
    /// Typical single-serving calories, used for the portion estimate.
    portion_kcal: u32,
}

struct CompoundDef {
    name: &'static str,
    class: Class,
    /// Both word patterns must appear, in either order, anywhere in the text.
    words: [&'static str; 2],
    portion_kcal: u32,
    /// Component tokens stripped before the single-ingredient scan.
    strip: [&'static str; 2],
}

const INGREDIENTS: &[IngredientDef] = &[
    IngredientDef { name: "курица", class: Class::Meat, pattern: r"\bкури[цн][а-яё]*", portion_kcal: 200 },
    IngredientDef { name: "говядина", class: Class::Meat, pattern: r"\bговядин[а-яё]*", portion_kcal: 220 },
    IngredientDef { name: "индейка", class: Class::Meat, pattern: r"\bиндейк[а-яё]*", portion_kcal: 190 },
    IngredientDef { name: "тунец", class: Class::Meat, pattern: r"\bтун(?:ец|ц[а-яё]+)", portion_kcal: 180 },
    IngredientDef { name: "лосось", class: Class::Meat, pattern: r"\bлосос[а-яё]*", portion_kcal: 200 },
    IngredientDef { name: "рыба", class: Class::Meat, pattern: r"\bрыб[а-яё]*", portion_kcal: 180 },
    IngredientDef { name: "котлета", class: Class::Meat, pattern: r"\bкотлет[а-яё]*", portion_kcal: 250 },
    IngredientDef { name: "мясо", class: Class::Meat, pattern: r"\bмяс[оаеун][а-яё]*|\bмясо\b", portion_kcal: 220 },
    IngredientDef { name: "яйцо", class: Class::Egg, pattern: r"\bяй[цч][а-яё]*|\bяичниц[а-яё]*", portion_kcal: 70 },
    IngredientDef { name: "рис", class: Class::Starch, pattern: r"\bрис(?:а|у|ом|е)?\b", portion_kcal: 130 },
    IngredientDef { name: "гречка", class: Class::Starch, pattern: r"\bгречк[а-яё]*|\bгречнев[а-яё]*", portion_kcal: 120 },
    IngredientDef { name: "булгур", class: Class::Starch, pattern: r"\bбулгур[а-яё]*", portion_kcal: 120 },
    IngredientDef { name: "макароны", class: Class::Starch, pattern: r"\bмакарон[а-яё]*|\bспагетти\b|\bлапш[а-яё]*|\bпаст[а-яё]*", portion_kcal: 160 },
    IngredientDef { name: "картофель", class: Class::Starch, pattern: r"\bкартофел[а-яё]*|\bкартошк[а-яё]*", portion_kcal: 150 },
    IngredientDef { name: "хлеб", class: Class::Starch, pattern: r"\bхлеб[а-яё]*", portion_kcal: 80 },
    IngredientDef { name: "сухарики", class: Class::Starch, pattern: r"\bсухарик[а-яё]*", portion_kcal: 100 },
    IngredientDef { name: "овсянка", class: Class::Starch, pattern: r"\bовсянк[а-яё]*|\bовсян[а-яё]*", portion_kcal: 150 },
    IngredientDef { name: "творог", class: Class::Dairy, pattern: r"\bтворо[гж][а-яё]*", portion_kcal: 150 },
    IngredientDef { name: "сыр", class: Class::Cheese, pattern: r"\bсыр(?:а|у|ом|е|ы|ов)?\b|\bфет[аы]\b|\bпармезан[а-яё]*|\bмоцарелл[а-яё]*", portion_kcal: 110 },
    IngredientDef { name: "огурцы", class: Class::Vegetable, pattern: r"\bогур[еч]?ц[а-яё]*|\bогуреч[а-яё]*", portion_kcal: 15 },
    IngredientDef { name: "помидоры", class: Class::Vegetable, pattern: r"\bпомидор[а-яё]*|\bтомат[а-яё]*", portion_kcal: 20 },
    IngredientDef { name: "перец", class: Class::Vegetable, pattern: r"\bперец\b|\bперц[а-яё]*", portion_kcal: 25 },
    IngredientDef { name: "капуста", class: Class::Vegetable, pattern: r"\bкапуст[а-яё]*", portion_kcal: 25 },
    IngredientDef { name: "зелень", class: Class::Vegetable, pattern: r"\bзелен[а-яё]*", portion_kcal: 5 },
    IngredientDef { name: "овощи", class: Class::Vegetable, pattern: r"\bовощ[а-яё]*", portion_kcal: 50 },
    IngredientDef { name: "оливки", class: Class::Vegetable, pattern: r"\bоливк[а-яё]*|\bмаслин[а-яё]*", portion_kcal: 40 },
    IngredientDef { name: "морковь", class: Class::Vegetable, pattern: r"\bморков[а-яё]*", portion_kcal: 30 },
    IngredientDef { name: "банан", class: Class::Fruit, pattern: r"\bбанан[а-яё]*", portion_kcal: 90 },
    IngredientDef { name: "яблоко", class: Class::Fruit, pattern: r"\bяблок[а-яё]*", portion_kcal: 50 },
    IngredientDef { name: "арбуз", class: Class::Fruit, pattern: r"\bарбуз[а-яё]*", portion_kcal: 40 },
    IngredientDef { name: "дыня", class: Class::Fruit, pattern: r"\bдын[а-яё]*", portion_kcal: 35 },
    IngredientDef { name: "майонез", class: Class::Dressing, pattern: r"\bмайонез[а-яё]*", portion_kcal: 100 },
    IngredientDef { name: "заправка", class: Class::Dressing, pattern: r"\bзаправк[а-яё]*|\bсоус[а-яё]*", portion_kcal: 60 },
    IngredientDef { name: "масло", class: Class::Oil, pattern: r"\bмасл(?:о|а|у|е|ом)\b", portion_kcal: 100 },
    IngredientDef { name: "орехи", class: Class::Nuts, pattern: r"\bорех[а-яё]*|\bарахис[а-яё]*|\bминдал[а-яё]*|\bфундук[а-яё]*|\bкешью\b", portion_kcal: 90 },
    IngredientDef { name: "нутелла", class: Class::NutPaste, pattern: r"\bнутелл[а-яё]*", portion_kcal: 110 },
];

const COMPOUNDS: &[CompoundDef] = &[
    CompoundDef {
        name: "арахисовая паста",
        class: Class::NutPaste,
        words: [r"\bарахис[а-яё]*", r"\bпаст[а-яё]*"],
        portion_kcal: 120,
        strip: [r"\bарахис[а-яё]*", r"\bпаст[а-яё]*"],
    },
    CompoundDef {
        name: "морковь по-корейски",
        class: Class::KoreanCarrot,
        words: [r"\bморков[а-яё]*", r"\bкорейск[а-яё]*"],
        portion_kcal: 120,
        strip: [r"\bморков[а-яё]*", r"\bкорейск[а-яё]*"],
    },
];

// Keyword lists for the staple sanity checks, scanned over the raw
// lowercased description (not the compound-stripped copy).
static LOW_CAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"огур[еч]?ц|огуреч|помидор|томат|капуст|кабачк|сельдере|редис|зелен|яблок|арбуз|дын|салат",
    )
    .expect("low-cal staple pattern")
});

static HIGH_CAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"орех|арахис|шоколад|жарен|бекон|сливочн|майонез|нутелл|сыр(?:а|у|ом|е|ы|ов)?\b|масл(?:о|а|у|е|ом)\b")
        .expect("high-cal staple pattern")
});

static VERY_HIGH_CAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"нутелл|орех|арахис|миндал|фундук|кешью|сыр(?:а|у|ом|е|ы|ов)?\b|масл(?:о|а|у|е|ом)\b")
        .expect("very-high-cal pattern")
});

static SALAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bсалат[а-яё]*").expect("salad pattern"));

struct Compiled {
    ingredients: Vec<(usize, Regex)>,
    compounds: Vec<(usize, [Regex; 2], [Regex; 2])>,
}

static COMPILED: Lazy<Compiled> = Lazy::new(|| Compiled {
    ingredients: INGREDIENTS
        .iter()
        .enumerate()
        .map(|(i, d)| (i, Regex::new(d.pattern).expect("ingredient pattern")))
        .collect(),
    compounds: COMPOUNDS
        .iter()
        .enumerate()
        .map(|(i, d)| {
            (
                i,
                [
                    Regex::new(d.words[0]).expect("compound word pattern"),
                    Regex::new(d.words[1]).expect("compound word pattern"),
                ],
                [
                    Regex::new(d.strip[0]).expect("compound strip pattern"),
                    Regex::new(d.strip[1]).expect("compound strip pattern"),
                ],
            )
        })
        .collect(),
});

/// Everything the validator needs to know about a dish description,
/// computed in one pass. Transient; recomputed per validation call.
#[derive(Debug, Clone, Default)]
pub(crate) struct DishSignals {
    /// Distinct recognized ingredients (compounds count as one entry).
    pub ingredients: BTreeSet<&'static str>,
    pub has_meat: bool,
    pub has_egg: bool,
    pub has_starch: bool,
    pub has_cheese: bool,
    pub has_dressing: bool,
    pub has_mayo: bool,
    pub has_salad: bool,
    pub has_korean_carrot: bool,
    pub has_low_cal: bool,
    pub has_high_cal: bool,
    pub has_very_high_cal: bool,
    /// Sum of per-serving calorie estimates for the detected ingredients.
    pub portion_estimate: f64,
}

/// The set of recognized ingredients mentioned in a description.
pub(crate) fn detect(description: &str) -> BTreeSet<&'static str> {
    signals(description).ingredients
}

pub(crate) fn signals(description: &str) -> DishSignals {
    let lower = description.to_lowercase();
    let mut out = DishSignals::default();
    let mut portion: u32 = 0;

    // Compounds first; strip their component tokens so the single scan does
    // not double-count "паста" as pasta or "арахис" as loose nuts.
    let mut working = lower.clone();
    for (i, words, strip) in &COMPILED.compounds {
        let def = &COMPOUNDS[*i];
        if words[0].is_match(&working) && words[1].is_match(&working) {
            out.ingredients.insert(def.name);
            portion += def.portion_kcal;
            apply_class(&mut out, def.class);
            for s in strip {
                working = s.replace_all(&working, " ").into_owned();
            }
        }
    }

    for (i, re) in &COMPILED.ingredients {
        let def = &INGREDIENTS[*i];
        if re.is_match(&working) && out.ingredients.insert(def.name) {
            portion += def.portion_kcal;
            apply_class(&mut out, def.class);
            if def.name == "майонез" {
                out.has_mayo = true;
            }
        }
    }

    out.has_salad = SALAD.is_match(&lower);
    out.has_low_cal = LOW_CAL.is_match(&lower);
    out.has_high_cal = HIGH_CAL.is_match(&lower);
    out.has_very_high_cal = VERY_HIGH_CAL.is_match(&lower);

    // A salad implies dressing and extra vegetables beyond what was named.
    if out.has_salad && portion < 200 {
        portion += 100;
    }
    out.portion_estimate = f64::from(portion);
    out
}

fn apply_class(out: &mut DishSignals, class: Class) {
    match class {
        Class::Meat => out.has_meat = true,
        Class::Egg => out.has_egg = true,
        Class::Starch => out.has_starch = true,
        Class::Cheese => out.has_cheese = true,
        Class::Dressing => out.has_dressing = true,
        Class::Oil => out.has_dressing = true,
        Class::KoreanCarrot => out.has_korean_carrot = true,
        Class::Dairy | Class::Vegetable | Class::Fruit | Class::Nuts | Class::NutPaste => {}
    }
}
