//! Per-user JSON persistence: profile, meal log, daily diary totals, weight
//! and burned-calorie records.
//!
//! Each user owns a directory of small JSON files. Writes go through a temp
//! file and an atomic rename so a crash never leaves a half-written log.
//!
//! Meal log entries are stored as JSON arrays, not objects, and two shapes
//! coexist in the wild: the legacy 2-element `[description, calories]` and
//! the current 5-element `[description, calories, protein, fat, carbs]` with
//! `null` for unknown macros. Reads accept both; writes always produce the
//! 5-element shape. A missing macro means "unknown", never zero.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::budget::{Goal, Sex};

pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "bot_data";

/// One logged meal. Serialized as a 5-element array for compactness.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodLogEntry {
    pub description: String,
    pub calories: i64,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
}

impl Serialize for FoodLogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(5))?;
        seq.serialize_element(&self.description)?;
        seq.serialize_element(&self.calories)?;
        seq.serialize_element(&self.protein_g)?;
        seq.serialize_element(&self.fat_g)?;
        seq.serialize_element(&self.carbs_g)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for FoodLogEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = FoodLogEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a food log entry array of 2 or 5 elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let description: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                // Old writers stored calories as a float.
                let calories: f64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let protein_g = seq.next_element::<Option<f64>>()?.flatten();
                let fat_g = seq.next_element::<Option<f64>>()?.flatten();
                let carbs_g = seq.next_element::<Option<f64>>()?.flatten();
                Ok(FoodLogEntry {
                    description,
                    calories: calories as i64,
                    protein_g,
                    fat_g,
                    carbs_g,
                })
            }
        }

        deserializer.deserialize_seq(EntryVisitor)
    }
}

/// Daily totals over a slice of entries. Macro sums cover only the entries
/// that carry the macro; `None` means no entry carried it at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    pub calories: i64,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub entries: usize,
}

pub fn sum_entries(entries: &[FoodLogEntry]) -> DayTotal {
    fn add(acc: Option<f64>, v: Option<f64>) -> Option<f64> {
        match (acc, v) {
            (Some(a), Some(b)) => Some(a + b),
            (None, Some(b)) => Some(b),
            (acc, None) => acc,
        }
    }
    let mut total = DayTotal {
        calories: 0,
        protein_g: None,
        fat_g: None,
        carbs_g: None,
        entries: entries.len(),
    };
    for e in entries {
        total.calories += e.calories;
        total.protein_g = add(total.protein_g, e.protein_g);
        total.fat_g = add(total.fat_g, e.fat_g);
        total.carbs_g = add(total.carbs_g, e.carbs_g);
    }
    total
}

/// User profile; every field optional so partial onboarding round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<u32>,
    pub sex: Option<Sex>,
    pub goal: Option<Goal>,
    pub daily_target_kcal: Option<i64>,
}

/// File-backed store rooted at one data directory.
#[derive(Debug, Clone)]
pub struct UserStore {
    root: PathBuf,
}

impl UserStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Root from `DATA_DIR`, defaulting to `bot_data`.
    pub fn from_env() -> Self {
        let root = std::env::var(ENV_DATA_DIR).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_owned());
        Self::new(root)
    }

    fn user_dir(&self, user_id: u64) -> PathBuf {
        self.root.join(format!("user_{user_id}"))
    }

    fn file(&self, user_id: u64, name: &str) -> PathBuf {
        self.user_dir(user_id).join(format!("{name}.json"))
    }

    fn read_json<T: for<'de> Deserialize<'de> + Default>(&self, path: &Path) -> anyhow::Result<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> anyhow::Result<()> {
        let dir = path.parent().context("data file has no parent directory")?;
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, content).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
        debug!(path = %path.display(), "persisted");
        Ok(())
    }

    pub fn load_profile(&self, user_id: u64) -> anyhow::Result<UserProfile> {
        self.read_json(&self.file(user_id, "profile"))
    }

    pub fn save_profile(&self, user_id: u64, profile: &UserProfile) -> anyhow::Result<()> {
        self.write_json(&self.file(user_id, "profile"), profile)
    }

    /// Meal log keyed by date, each day an ordered list of entries.
    pub fn load_food_log(
        &self,
        user_id: u64,
    ) -> anyhow::Result<BTreeMap<NaiveDate, Vec<FoodLogEntry>>> {
        self.read_json(&self.file(user_id, "food_log"))
    }

    pub fn save_food_log(
        &self,
        user_id: u64,
        log: &BTreeMap<NaiveDate, Vec<FoodLogEntry>>,
    ) -> anyhow::Result<()> {
        self.write_json(&self.file(user_id, "food_log"), log)
    }

    /// Running per-day calorie totals, the quick-read companion to the log.
    pub fn load_diary(&self, user_id: u64) -> anyhow::Result<BTreeMap<NaiveDate, i64>> {
        self.read_json(&self.file(user_id, "diary"))
    }

    pub fn save_diary(&self, user_id: u64, diary: &BTreeMap<NaiveDate, i64>) -> anyhow::Result<()> {
        self.write_json(&self.file(user_id, "diary"), diary)
    }

    pub fn load_weights(&self, user_id: u64) -> anyhow::Result<BTreeMap<NaiveDate, f64>> {
        self.read_json(&self.file(user_id, "weights"))
    }

    pub fn save_weights(
        &self,
        user_id: u64,
        weights: &BTreeMap<NaiveDate, f64>,
    ) -> anyhow::Result<()> {
        self.write_json(&self.file(user_id, "weights"), weights)
    }

    pub fn load_burned(&self, user_id: u64) -> anyhow::Result<BTreeMap<NaiveDate, i64>> {
        self.read_json(&self.file(user_id, "burned"))
    }

    pub fn save_burned(&self, user_id: u64, burned: &BTreeMap<NaiveDate, i64>) -> anyhow::Result<()> {
        self.write_json(&self.file(user_id, "burned"), burned)
    }

    /// Append one meal to the log and bump the diary total for that date.
    pub fn log_meal(&self, user_id: u64, date: NaiveDate, entry: FoodLogEntry) -> anyhow::Result<()> {
        let mut log = self.load_food_log(user_id).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "food log unreadable, starting fresh");
            BTreeMap::new()
        });
        let mut diary = self.load_diary(user_id).unwrap_or_default();

        *diary.entry(date).or_insert(0) += entry.calories;
        log.entry(date).or_default().push(entry);

        self.save_food_log(user_id, &log)?;
        self.save_diary(user_id, &diary)
    }

    /// Totals for one day, straight from the log.
    pub fn day_total(&self, user_id: u64, date: NaiveDate) -> anyhow::Result<DayTotal> {
        let log = self.load_food_log(user_id)?;
        Ok(sum_entries(log.get(&date).map(Vec::as_slice).unwrap_or(&[])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(desc: &str, cal: i64, p: Option<f64>) -> FoodLogEntry {
        FoodLogEntry {
            description: desc.into(),
            calories: cal,
            protein_g: p,
            fat_g: None,
            carbs_g: None,
        }
    }

    #[test]
    fn legacy_two_element_entries_deserialize() {
        let e: FoodLogEntry = serde_json::from_str(r#"["борщ", 250]"#).unwrap();
        assert_eq!(e.description, "борщ");
        assert_eq!(e.calories, 250);
        assert_eq!(e.protein_g, None);
        assert_eq!(e.fat_g, None);
        assert_eq!(e.carbs_g, None);
    }

    #[test]
    fn current_five_element_entries_round_trip() {
        let e: FoodLogEntry =
            serde_json::from_str(r#"["омлет", 280.0, 22.0, null, 6.5]"#).unwrap();
        assert_eq!(e.calories, 280);
        assert_eq!(e.protein_g, Some(22.0));
        assert_eq!(e.fat_g, None);
        assert_eq!(e.carbs_g, Some(6.5));

        let json = serde_json::to_string(&e).unwrap();
        let back: FoodLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn serialization_always_writes_five_elements() {
        let json = serde_json::to_value(entry("чай", 5, None)).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 5);
        assert!(arr[2].is_null());
    }

    #[test]
    fn sum_entries_keeps_unknown_macros_unknown() {
        let total = sum_entries(&[
            entry("борщ", 250, None),
            entry("курица", 330, Some(31.0)),
            entry("гречка", 180, Some(6.0)),
        ]);
        assert_eq!(total.calories, 760);
        assert_eq!(total.protein_g, Some(37.0));
        assert_eq!(total.fat_g, None);
        assert_eq!(total.entries, 3);
    }

    #[test]
    fn sum_of_nothing_is_empty() {
        let total = sum_entries(&[]);
        assert_eq!(total.calories, 0);
        assert_eq!(total.protein_g, None);
        assert_eq!(total.entries, 0);
    }
}
