use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::RecommendError;

/// Catalog shipped with the crate (Tanzanian food composition table).
pub const BUILTIN_CATALOG: &str = include_str!("../catalog/vyakula.toml");

// ---------------------------------------------------------------------------
// Top-level catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    #[serde(default = "default_code_column")]
    pub code_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    pub groups: BTreeMap<String, FoodGroup>,
    #[serde(default)]
    pub goals: BTreeMap<String, HealthGoal>,
}

fn default_code_column() -> String {
    "code".into()
}

fn default_name_column() -> String {
    "Chakula".into()
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodGroup {
    #[serde(default)]
    pub label: String,
    pub ranges: Vec<CodeRange>,
}

impl FoodGroup {
    pub fn contains(&self, code: i64) -> bool {
        self.ranges.iter().any(|r| r.contains(code))
    }
}

/// Inclusive code range. Written as `[start, end]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct CodeRange {
    pub start: i64,
    pub end: i64,
}

impl CodeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, code: i64) -> bool {
        self.start <= code && code <= self.end
    }
}

impl From<[i64; 2]> for CodeRange {
    fn from([start, end]: [i64; 2]) -> Self {
        Self { start, end }
    }
}

impl From<CodeRange> for [i64; 2] {
    fn from(r: CodeRange) -> Self {
        [r.start, r.end]
    }
}

impl std::fmt::Display for CodeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthGoal {
    pub fields: Vec<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Catalog {
    pub fn from_toml(input: &str) -> Result<Self, RecommendError> {
        let catalog: Catalog =
            toml::from_str(input).map_err(|e| RecommendError::CatalogParse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self, RecommendError> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn to_toml(&self) -> Result<String, RecommendError> {
        toml::to_string_pretty(self).map_err(|e| RecommendError::CatalogParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.groups.is_empty() {
            return Err(RecommendError::CatalogValidation(
                "at least 1 group is required".into(),
            ));
        }

        if self.code_column.trim().is_empty() || self.name_column.trim().is_empty() {
            return Err(RecommendError::CatalogValidation(
                "code_column and name_column must not be empty".into(),
            ));
        }

        for (key, group) in &self.groups {
            if group.ranges.is_empty() {
                return Err(RecommendError::CatalogValidation(format!(
                    "group '{key}' has no ranges"
                )));
            }
            for r in &group.ranges {
                if r.start > r.end {
                    return Err(RecommendError::CatalogValidation(format!(
                        "group '{key}': range start {} is after end {}",
                        r.start, r.end
                    )));
                }
            }

            let mut sorted = group.ranges.clone();
            sorted.sort_by_key(|r| r.start);
            for pair in sorted.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if b.start <= a.end {
                    return Err(RecommendError::OverlappingRanges {
                        group: key.clone(),
                        a_start: a.start,
                        a_end: a.end,
                        b_start: b.start,
                        b_end: b.end,
                    });
                }
            }
        }

        for (label, goal) in &self.goals {
            let mut seen = HashSet::new();
            for field in &goal.fields {
                if !seen.insert(field.as_str()) {
                    return Err(RecommendError::CatalogValidation(format!(
                        "goal '{label}': field '{field}' listed twice"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolve a group by key (`B1`) or by label (case-insensitive).
    pub fn resolve_group(&self, input: &str) -> Option<&str> {
        let needle = input.trim();
        if let Some((key, _)) = self.groups.get_key_value(needle) {
            return Some(key.as_str());
        }
        self.groups
            .iter()
            .find(|(_, g)| g.label.eq_ignore_ascii_case(needle))
            .map(|(key, _)| key.as_str())
    }

    pub fn goal_fields(&self, goal: &str) -> &[String] {
        self.goals.get(goal).map(|g| g.fields.as_slice()).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
