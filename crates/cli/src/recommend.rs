// `lishe recommend`

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use lishe_io::csv::load_food_table;
use lishe_io::history::entries_for_run;
use lishe_io::HistoryLog;
use lishe_recommend::metrics::{BodyMetrics, BodyProfile};
use lishe_recommend::{recommend, Catalog, FoodTable, RecommendRequest, Recommendations};

use crate::digest::{item_digests, run_digest, Digest};
use crate::{load_catalog, print_json, CliError, DigestMode};

pub struct RecommendOptions {
    pub goal: String,
    pub groups: Vec<String>,
    pub top_n: usize,
    pub table: PathBuf,
    pub catalog: Option<PathBuf>,
    /// Set when the run should be appended to the history log.
    pub history_dir: Option<PathBuf>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub profile: Option<BodyProfile>,
    pub digest: Option<DigestMode>,
    pub json: bool,
}

#[derive(Serialize)]
struct RecommendOutput<'a> {
    #[serde(flatten)]
    recommendations: &'a Recommendations,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<BodyMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history_file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    digests: Vec<Digest>,
}

pub fn cmd_recommend(opts: RecommendOptions) -> Result<(), CliError> {
    let request = RecommendRequest::new(opts.goal.trim(), opts.groups.clone(), opts.top_n);
    request.validate()?;

    let catalog = load_catalog(opts.catalog.as_deref())?;
    let table = load_food_table(&opts.table, &catalog).map_err(CliError::from_table)?;
    if table.is_empty() {
        log::warn!("{}: no foods to rank", opts.table.display());
    }

    let result = recommend(&catalog, &table, &request);
    let metrics = opts.profile.as_ref().map(BodyProfile::metrics);

    let history_file = match &opts.history_dir {
        Some(dir) => log_run(
            dir,
            &catalog,
            &result,
            &table,
            opts.email.as_deref(),
            opts.profile.as_ref().zip(metrics.as_ref()),
        )?,
        None => None,
    };

    let digests = match opts.digest {
        None => Vec::new(),
        Some(DigestMode::Run) => vec![run_digest(&result)],
        Some(DigestMode::Items) => item_digests(&result, opts.name.as_deref(), metrics.as_ref()),
    };

    if opts.json {
        return print_json(&RecommendOutput {
            recommendations: &result,
            metrics,
            history_file: history_file.map(|p| p.display().to_string()),
            digests,
        });
    }

    print_text(&catalog, &result, metrics.as_ref());
    for digest in &digests {
        println!();
        print!("{}", digest.render());
    }
    if let Some(path) = history_file {
        eprintln!("logged {} food(s) to {}", result.total_foods(), path.display());
    }
    Ok(())
}

fn log_run(
    dir: &Path,
    catalog: &Catalog,
    result: &Recommendations,
    table: &FoodTable,
    email: Option<&str>,
    profile: Option<(&BodyProfile, &BodyMetrics)>,
) -> Result<Option<PathBuf>, CliError> {
    if !catalog.goals.contains_key(&result.meta.goal) {
        log::warn!(
            "history: goal '{}' is not in the catalog, not logging",
            result.meta.goal
        );
        return Ok(None);
    }

    let entries = entries_for_run(
        result,
        table,
        email.unwrap_or_default(),
        profile,
        Local::now().naive_local(),
    );
    if entries.is_empty() {
        log::info!("history: nothing recommended, not logging");
        return Ok(None);
    }
    HistoryLog::new(dir)
        .append(&result.meta.goal, &entries)
        .map(Some)
        .map_err(CliError::from_history)
}

fn print_text(catalog: &Catalog, result: &Recommendations, metrics: Option<&BodyMetrics>) {
    let meta = &result.meta;
    if meta.fields.is_empty() {
        println!("Goal: {} (no scoring fields, table order)", meta.goal);
    } else {
        println!("Goal: {} ({})", meta.goal, meta.fields.join(" + "));
    }
    if let Some(m) = metrics {
        println!("BMI {}  BMR {}  TDEE {}", m.bmi, m.bmr, m.tdee);
    }

    for group in &result.groups {
        println!();
        if !catalog.groups.contains_key(&group.group) {
            println!("{}  (unknown group)", group.group);
            continue;
        }
        println!("{}  {}  ({} matched)", group.group, group.label, group.matched);
        if group.foods.is_empty() {
            println!("  (no foods)");
        }
        for (i, food) in group.foods.iter().enumerate() {
            println!("  {:>2}. {:<40} {:>10.2}", i + 1, food.name, food.score);
        }
    }
}
