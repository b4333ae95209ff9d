//! Manual calorie override: "шоколадка, 205 ккал" style messages where the
//! user states the value directly, bypassing extraction and validation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted calorie range for a manual entry, kcal.
const MANUAL_CALORIE_RANGE: std::ops::RangeInclusive<i64> = 1..=5000;

// Food name, separator, number, unit word, end of message. Ordered so the
// explicit-separator form wins over the bare whitespace form.
static MANUAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(.+?)\s*[,\-:]\s*(\d+)\s*(?:ккал|калори[йяеи]|kcal)\s*$",
        r"(?i)^(.+?)\s+(\d+)\s*(?:ккал|калори[йяеи]|kcal)\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid manual override pattern"))
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntry {
    pub name: String,
    pub calories: i64,
}

/// Parse a manual override from a full message. `None` means the message is
/// not an override and should flow through the normal pipeline.
pub fn parse_manual_calories(text: &str) -> Option<ManualEntry> {
    let text = text.trim();
    for re in MANUAL_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            let name = caps.get(1)?.as_str().trim().to_owned();
            let calories: i64 = caps.get(2)?.as_str().parse().ok()?;
            if name.is_empty() || !MANUAL_CALORIE_RANGE.contains(&calories) {
                continue;
            }
            return Some(ManualEntry { name, calories });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<(String, i64)> {
        parse_manual_calories(text).map(|e| (e.name, e.calories))
    }

    #[test]
    fn comma_separated_form() {
        assert_eq!(parse("шоколадка, 205 ккал"), Some(("шоколадка".into(), 205)));
    }

    #[test]
    fn dash_colon_and_space_separators() {
        assert_eq!(parse("кофе с молоком - 60 ккал"), Some(("кофе с молоком".into(), 60)));
        assert_eq!(parse("протеиновый батончик: 210 ккал"), Some(("протеиновый батончик".into(), 210)));
        assert_eq!(parse("яблоко 52 ккал"), Some(("яблоко".into(), 52)));
    }

    #[test]
    fn unit_word_variants() {
        assert_eq!(parse("обед, 640 калорий"), Some(("обед".into(), 640)));
        assert_eq!(parse("snack, 150 kcal"), Some(("snack".into(), 150)));
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert_eq!(parse("вода, 0 ккал"), None);
        assert_eq!(parse("пир, 9000 ккал"), None);
    }

    #[test]
    fn non_override_messages_pass_through() {
        assert_eq!(parse("что мне съесть на ужин?"), None);
        assert_eq!(parse("сегодня я съел много ккал"), None);
        assert_eq!(parse("205 ккал"), None);
    }

    #[test]
    fn trailing_text_after_unit_is_not_an_override() {
        assert_eq!(parse("шоколадка, 205 ккал и ещё чай"), None);
    }
}
