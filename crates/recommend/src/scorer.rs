use std::collections::HashSet;

use crate::catalog::{Catalog, FoodGroup};
use crate::model::{GroupRecommendation, RankedFood, RecommendMeta, RecommendRequest, Recommendations};
use crate::table::{FoodRecord, FoodTable};

/// Rank foods within each requested group by the goal's nutrient sum.
///
/// Never fails: unknown goals score every food 0, unknown or empty groups
/// produce empty lists.
pub fn recommend(catalog: &Catalog, table: &FoodTable, request: &RecommendRequest) -> Recommendations {
    let (fields, missing_fields) = resolve_fields(catalog, table, &request.goal);

    if !catalog.goals.contains_key(&request.goal) {
        log::warn!("unknown goal '{}': every food scores 0", request.goal);
    } else if !missing_fields.is_empty() {
        log::info!(
            "goal '{}': table has no column for {}",
            request.goal,
            missing_fields.join(", ")
        );
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut groups = Vec::new();

    for requested in &request.groups {
        let requested = requested.trim();
        if requested.is_empty() {
            continue;
        }

        let resolved = catalog.resolve_group(requested);
        let key = resolved.unwrap_or(requested).to_string();
        if !seen.insert(key.clone()) {
            continue;
        }

        let Some(group) = resolved.and_then(|k| catalog.groups.get(k)) else {
            log::warn!("unknown food group '{requested}'");
            groups.push(GroupRecommendation {
                group: key,
                label: String::new(),
                matched: 0,
                foods: Vec::new(),
            });
            continue;
        };

        let members = member_rows(group, table);
        let matched = members.len();
        let foods = rank(members, &fields, request.top_n);

        log::debug!(
            "group '{key}': {matched} foods matched, returning {}",
            foods.len()
        );

        groups.push(GroupRecommendation {
            group: key,
            label: group.label.clone(),
            matched,
            foods,
        });
    }

    Recommendations {
        meta: RecommendMeta {
            catalog: catalog.name.clone(),
            goal: request.goal.clone(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            missing_fields,
            top_n: request.top_n,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        groups,
    }
}

/// Split the goal's fields into those present in the table and those absent.
fn resolve_fields<'a>(
    catalog: &'a Catalog,
    table: &FoodTable,
    goal: &str,
) -> (Vec<&'a str>, Vec<String>) {
    let mut present = Vec::new();
    let mut missing = Vec::new();
    for field in catalog.goal_fields(goal) {
        if table.has_column(field) {
            present.push(field.as_str());
        } else {
            missing.push(field.clone());
        }
    }
    (present, missing)
}

/// Records whose code falls inside any of the group's ranges, in table order.
/// A record is visited once, so it cannot appear twice.
pub fn group_members<'t>(group: &FoodGroup, table: &'t FoodTable) -> Vec<&'t FoodRecord> {
    member_rows(group, table).into_iter().map(|(_, r)| r).collect()
}

/// `group_members` paired with each record's row index.
fn member_rows<'t>(group: &FoodGroup, table: &'t FoodTable) -> Vec<(usize, &'t FoodRecord)> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| group.contains(r.code))
        .collect()
}

/// Sum of the given nutrient fields. Non-negative by construction.
pub fn score(record: &FoodRecord, fields: &[&str]) -> f64 {
    fields.iter().map(|f| record.nutrient(f)).sum()
}

fn rank(members: Vec<(usize, &FoodRecord)>, fields: &[&str], top_n: usize) -> Vec<RankedFood> {
    let mut scored: Vec<RankedFood> = members
        .into_iter()
        .map(|(row, r)| RankedFood {
            row,
            code: r.code,
            name: r.name.clone(),
            score: score(r, fields),
        })
        .collect();

    // sort_by is stable: equal scores keep table order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    scored
}
