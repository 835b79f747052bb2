//! Recommendation history log.
//!
//! One CSV per health goal (`<goal with spaces as _>.csv`) inside the history
//! directory. Each row is one recommended food together with the body metrics
//! and a nutrient snapshot at the time it was recommended. Users rate rows
//! later; the rating column stays empty until then.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use lishe_recommend::metrics::{BodyMetrics, BodyProfile};
use lishe_recommend::{FoodRecord, FoodTable, Recommendations};

use crate::error::IoError;

/// Email recorded for runs without a user.
pub const GUEST_EMAIL: &str = "guest";

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub const MAX_RATING: u8 = 4;

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// A rating cell. Cells off the 0..=4 scale are kept verbatim so rewriting
/// the log never loses them, and they still count as rated.
#[derive(Debug, Clone, PartialEq)]
pub enum Rating {
    Score(u8),
    Other(String),
}

impl Rating {
    pub fn score(&self) -> Option<u8> {
        match self {
            Self::Score(v) => Some(*v),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score(v) => write!(f, "{v}"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Score(v) => s.serialize_u8(*v),
            Self::Other(raw) => s.serialize_str(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "de_opt_u32")]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub bmi: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub bmr: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub tdee: Option<f64>,
    #[serde(default)]
    pub food: String,
    #[serde(default, deserialize_with = "de_rating")]
    pub rating: Option<Rating>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub protein_g: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub fiber_g: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub omega3_g: Option<f64>,
    #[serde(rename = "vitC_mg", default, deserialize_with = "csv::invalid_option")]
    pub vit_c_mg: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub calories_kc: Option<f64>,
    #[serde(default)]
    pub date: String,
}

impl HistoryEntry {
    /// Snapshot of one recommended food. Nutrients are read leniently.
    pub fn snapshot(
        email: &str,
        profile: Option<(&BodyProfile, &BodyMetrics)>,
        record: &FoodRecord,
        at: NaiveDateTime,
    ) -> Self {
        let email = email.trim();
        Self {
            email: if email.is_empty() {
                GUEST_EMAIL.to_string()
            } else {
                email.to_lowercase()
            },
            age: profile.map(|(p, _)| p.age),
            sex: profile.map(|(p, _)| p.sex.code().to_string()).unwrap_or_default(),
            bmi: profile.map(|(_, m)| m.bmi),
            bmr: profile.map(|(_, m)| m.bmr),
            tdee: profile.map(|(_, m)| m.tdee),
            food: record.name.clone(),
            rating: None,
            protein_g: Some(record.nutrient_lenient("PROCNT")),
            fiber_g: Some(record.nutrient_lenient("FIB")),
            omega3_g: Some(record.nutrient_lenient("FAPU")),
            vit_c_mg: Some(record.nutrient_lenient("VITC")),
            calories_kc: Some(record.nutrient_lenient("ENERGY_KC")),
            date: at.format(DATE_FORMAT).to_string(),
        }
    }

    /// Recorded timestamp, if it parses.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date)
    }
}

/// One entry per recommended food, group by group. Each snapshot reads the
/// exact table row that was ranked, so rows sharing a code stay distinct.
pub fn entries_for_run(
    recommendations: &Recommendations,
    table: &FoodTable,
    email: &str,
    profile: Option<(&BodyProfile, &BodyMetrics)>,
    at: NaiveDateTime,
) -> Vec<HistoryEntry> {
    recommendations
        .groups
        .iter()
        .flat_map(|g| g.foods.iter())
        .filter_map(|food| table.records.get(food.row))
        .map(|record| HistoryEntry::snapshot(email, profile, record, at))
        .collect()
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HistoryLog {
    dir: PathBuf,
}

impl HistoryLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<goal with spaces as _>.csv` inside the log directory. Goals that
    /// would name a path outside it are rejected.
    pub fn goal_file(&self, goal: &str) -> Result<PathBuf, IoError> {
        let stem = goal.trim().replace(' ', "_");
        if stem.is_empty() || stem.contains(['/', '\\']) || stem.contains("..") {
            return Err(IoError::InvalidGoal(goal.to_string()));
        }
        Ok(self.dir.join(format!("{stem}.csv")))
    }

    /// Entries for one goal; a missing file is an empty log.
    pub fn load_goal(&self, goal: &str) -> Result<Vec<HistoryEntry>, IoError> {
        let path = self.goal_file(goal)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_entries(&path)
    }

    /// Append entries to the goal's file, creating it with a header if needed.
    pub fn append(&self, goal: &str, entries: &[HistoryEntry]) -> Result<PathBuf, IoError> {
        let path = self.goal_file(goal)?;
        let mut all = self.load_goal(goal)?;
        all.extend_from_slice(entries);
        write_entries(&path, &all)?;
        log::info!(
            "history: appended {} row(s) to {}",
            entries.len(),
            path.display()
        );
        Ok(path)
    }

    /// Every entry for `email` across all goal files, in file-name order.
    pub fn entries_for(&self, email: &str) -> Result<Vec<(String, HistoryEntry)>, IoError> {
        let mut out = Vec::new();
        for (goal_file, path) in self.goal_files()? {
            for entry in read_entries(&path)? {
                if same_email(&entry.email, email) {
                    out.push((goal_file.clone(), entry));
                }
            }
        }
        Ok(out)
    }

    /// `(file stem, path)` of every `.csv` in the history directory.
    pub fn goal_files(&self) -> Result<Vec<(String, PathBuf)>, IoError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let read_err = |source| IoError::Read {
            path: self.dir.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            files.push((stem, path));
        }
        files.sort();
        Ok(files)
    }

    /// Set `rating` on the user's unrated rows of `goal` that are at least
    /// `delay_days` old. Returns the number of rows rated; the file is only
    /// rewritten when that number is non-zero.
    pub fn rate(
        &self,
        goal: &str,
        email: &str,
        rating: u8,
        delay_days: u32,
        now: NaiveDateTime,
    ) -> Result<usize, IoError> {
        if rating > MAX_RATING {
            return Err(IoError::InvalidRating(rating));
        }

        let mut entries = self.load_goal(goal)?;
        let min_age = Duration::days(i64::from(delay_days));
        let mut rated = 0usize;

        for entry in entries.iter_mut() {
            if !same_email(&entry.email, email) || entry.rating.is_some() {
                continue;
            }
            let Some(at) = entry.recorded_at() else {
                continue;
            };
            if now - at >= min_age {
                entry.rating = Some(Rating::Score(rating));
                rated += 1;
            }
        }

        if rated > 0 {
            write_entries(&self.goal_file(goal)?, &entries)?;
            log::info!("history: rated {rated} row(s) for goal '{goal}'");
        }
        Ok(rated)
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>, IoError> {
    let csv_err = |e: csv::Error| IoError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut entries = Vec::new();
    for row in reader.deserialize() {
        entries.push(row.map_err(csv_err)?);
    }
    Ok(entries)
}

fn write_entries(path: &Path, entries: &[HistoryEntry]) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| IoError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |e: csv::Error| IoError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for entry in entries {
        writer.serialize(entry).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Timestamps as written by this log, ISO `T` variants, or a bare date.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// Ratings and ages written by spreadsheet tools come back as `3.0`.
fn de_rating<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Rating>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let score = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && (0.0..=f64::from(MAX_RATING)).contains(v));
    Ok(Some(match score {
        Some(v) => Rating::Score(v as u8),
        None => Rating::Other(raw),
    }))
}

fn de_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(de_opt_f64(d)?
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32))
}

fn de_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.and_then(|s| s.trim().parse::<f64>().ok()).filter(|v| v.is_finite()))
}
