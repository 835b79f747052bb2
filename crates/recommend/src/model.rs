use serde::Serialize;

use crate::error::RecommendError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One recommendation query: a goal, the groups to rank within, and how many
/// foods to return per group.
#[derive(Debug, Clone)]
pub struct RecommendRequest {
    pub goal: String,
    /// Group keys or labels, in the order the caller selected them.
    pub groups: Vec<String>,
    pub top_n: usize,
}

impl RecommendRequest {
    pub fn new(goal: impl Into<String>, groups: Vec<String>, top_n: usize) -> Self {
        Self {
            goal: goal.into(),
            groups,
            top_n,
        }
    }

    /// Caller-side checks. The scorer itself accepts any request.
    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.groups.iter().all(|g| g.trim().is_empty()) {
            return Err(RecommendError::NoGroupSelected);
        }
        if self.top_n == 0 {
            return Err(RecommendError::InvalidCount);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFood {
    /// Index of the ranked record in `FoodTable::records`.
    pub row: usize,
    pub code: i64,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRecommendation {
    /// Resolved group key, or the raw request string when it matched no group.
    pub group: String,
    pub label: String,
    /// Number of foods in the table that fell inside the group's ranges.
    pub matched: usize,
    pub foods: Vec<RankedFood>,
}

impl GroupRecommendation {
    pub fn names(&self) -> Vec<&str> {
        self.foods.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub meta: RecommendMeta,
    pub groups: Vec<GroupRecommendation>,
}

impl Recommendations {
    pub fn get(&self, group: &str) -> Option<&GroupRecommendation> {
        self.groups.iter().find(|g| g.group == group)
    }

    /// Every recommended food name, group by group.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.foods.iter().map(|f| f.name.as_str()))
    }

    pub fn total_foods(&self) -> usize {
        self.groups.iter().map(|g| g.foods.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendMeta {
    pub catalog: String,
    pub goal: String,
    /// Goal fields that exist in the table and were summed.
    pub fields: Vec<String>,
    /// Goal fields dropped because the table has no such column.
    pub missing_fields: Vec<String>,
    pub top_n: usize,
    pub engine_version: String,
    pub run_at: String,
}
