// End-to-end tests for the `lishe` binary.
//
// Each test runs in its own temp directory with an empty settings file so the
// user's real config is never read or written.
//
// Run with: cargo test -p lishe-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/vyakula.csv")
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("settings.json"), "{}").unwrap();
    dir
}

fn lishe(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lishe"));
    cmd.current_dir(dir)
        .env("LISHE_SETTINGS", dir.join("settings.json"))
        .env("LISHE_DATA", fixture())
        .env_remove("LISHE_CATALOG")
        .env_remove("LISHE_HISTORY_DIR")
        .env_remove("LISHE_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    lishe(dir).args(args).output().expect("run lishe")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status.code(),
        stderr(output)
    );
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_str(stdout(output).trim())
        .unwrap_or_else(|e| panic!("stdout must be JSON: {e}\n{}", stdout(output)))
}

fn names(group: &serde_json::Value) -> Vec<String> {
    group["foods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect()
}

// ===========================================================================
// recommend
// ===========================================================================

#[test]
fn recommend_json_top_two() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &["recommend", "--goal", "Kupunguza Uzito", "--group", "B1", "--top", "2", "--json"],
    );
    assert_success(&out);

    let val = json(&out);
    assert_eq!(val["meta"]["goal"], "Kupunguza Uzito");
    assert_eq!(val["meta"]["top_n"], 2);
    let group = &val["groups"][0];
    assert_eq!(group["group"], "B1");
    assert_eq!(group["matched"], 3);
    assert_eq!(names(group), vec!["Muhogo", "Ndizi mbichi"]);
    assert!(val.get("digests").is_none());
    assert!(val.get("history_file").is_none());
}

#[test]
fn recommend_text_output() {
    let dir = workspace();
    let out = run(dir.path(), &["recommend", "-g", "Kupunguza Uzito", "-G", "B1", "-G", "E"]);
    assert_success(&out);

    let text = stdout(&out);
    assert!(text.starts_with("Goal: Kupunguza Uzito (ENERGY_KC + PROCNT + FAT + CHOCDF + FIB)"));
    assert!(text.contains("B1  Mizizi, Viazi na Ndizi  (3 matched)"));
    assert!(text.contains("E  Mafuta  (0 matched)\n  (no foods)"));
    let muhogo = text.find("Muhogo").unwrap();
    let viazi = text.find("Viazi vitamu").unwrap();
    assert!(muhogo < viazi);
}

#[test]
fn recommend_group_by_label_and_unknown_group() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &["recommend", "-g", "Kupunguza Uzito", "-G", "mboga", "-G", "Z9", "--json"],
    );
    assert_success(&out);

    let val = json(&out);
    assert_eq!(val["groups"][0]["group"], "F3");
    assert_eq!(names(&val["groups"][0]), vec!["Sukuma wiki", "Mchicha"]);
    assert_eq!(val["groups"][1]["group"], "Z9");
    assert_eq!(val["groups"][1]["foods"].as_array().unwrap().len(), 0);
}

#[test]
fn recommend_unknown_goal_keeps_table_order() {
    let dir = workspace();
    let out = run(dir.path(), &["recommend", "-g", "Hakuna", "-G", "B1", "-n", "2", "--json"]);
    assert_success(&out);

    let val = json(&out);
    assert_eq!(names(&val["groups"][0]), vec!["Viazi vitamu", "Muhogo"]);
    assert_eq!(val["meta"]["fields"].as_array().unwrap().len(), 0);
}

#[test]
fn recommend_top_from_settings() {
    let dir = workspace();
    fs::write(dir.path().join("settings.json"), r#"{ "recommend.topN": 1 }"#).unwrap();
    let out = run(dir.path(), &["recommend", "-g", "Kupunguza Uzito", "-G", "B1", "--json"]);
    assert_success(&out);
    assert_eq!(names(&json(&out)["groups"][0]), vec!["Muhogo"]);
}

#[test]
fn recommend_without_group_exits_3() {
    let dir = workspace();
    let out = run(dir.path(), &["recommend", "-g", "Kupunguza Uzito"]);
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("hint:"));
    assert!(stdout(&out).is_empty());
}

#[test]
fn recommend_zero_top_is_usage_error() {
    let dir = workspace();
    let out = run(dir.path(), &["recommend", "-g", "Kupunguza Uzito", "-G", "B1", "-n", "0"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn recommend_missing_table_exits_5() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &["recommend", "-g", "Kupunguza Uzito", "-G", "B1", "--data", "nope.csv"],
    );
    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).contains("error:"));
}

#[test]
fn recommend_table_without_code_column_exits_5() {
    let dir = workspace();
    let table = dir.path().join("bad.csv");
    fs::write(&table, "id,Chakula\n1,Mahindi\n").unwrap();
    let out = run(
        dir.path(),
        &["recommend", "-g", "Kupunguza Uzito", "-G", "B1", "--data", table.to_str().unwrap()],
    );
    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).contains("missing column 'code'"));
}

#[test]
fn recommend_with_custom_catalog() {
    let dir = workspace();
    let catalog = dir.path().join("catalog.toml");
    fs::write(
        &catalog,
        r#"
name = "Vitamini"

[groups.MB]
label = "Mboga"
ranges = [[401, 450]]

[goals."Vitamini C"]
fields = ["VITC"]
"#,
    )
    .unwrap();

    let out = run(
        dir.path(),
        &["recommend", "-g", "Vitamini C", "-G", "MB", "--catalog", catalog.to_str().unwrap(), "--json"],
    );
    assert_success(&out);
    let val = json(&out);
    assert_eq!(val["meta"]["catalog"], "Vitamini");
    assert_eq!(names(&val["groups"][0]), vec!["Sukuma wiki", "Mchicha"]);
}

#[test]
fn recommend_with_profile_and_run_digest() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &[
            "recommend", "-g", "Kupunguza Uzito", "-G", "B1", "-n", "2",
            "--weight", "60", "--height", "1.7", "--age", "25", "--digest",
        ],
    );
    assert_success(&out);

    let text = stdout(&out);
    assert!(text.contains("BMI 20.76  BMR 1542.5"));
    assert!(text.contains("Subject: Mapendekezo ya Vyakula (Kupunguza Uzito)\n\nMuhogo\nNdizi mbichi\n"));
}

#[test]
fn recommend_item_digests_in_json() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &[
            "recommend", "-g", "Kupunguza Uzito", "-G", "B1", "-n", "2",
            "--digest", "items", "--name", "Asha", "--json",
        ],
    );
    assert_success(&out);

    let val = json(&out);
    let digests = val["digests"].as_array().unwrap();
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0]["subject"], "Mapendekezo: Muhogo - Kupunguza Uzito");
    assert!(digests[0]["body"].as_str().unwrap().starts_with("Habari Asha,"));
}

#[test]
fn partial_profile_is_usage_error() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &["recommend", "-g", "Kupunguza Uzito", "-G", "B1", "--weight", "60"],
    );
    assert_eq!(out.status.code(), Some(2));
}

// ===========================================================================
// history / rate
// ===========================================================================

#[test]
fn log_history_and_rate() {
    let dir = workspace();
    let history = dir.path().join("goal_history");
    let history_arg = history.to_str().unwrap();

    let out = run(
        dir.path(),
        &[
            "recommend", "-g", "Kupunguza Uzito", "-G", "B1", "-n", "2",
            "--log", "--email", "Asha@Example.com", "--history-dir", history_arg, "--json",
        ],
    );
    assert_success(&out);
    let logged = json(&out)["history_file"].as_str().unwrap().to_string();
    assert!(logged.ends_with("Kupunguza_Uzito.csv"));
    assert!(history.join("Kupunguza_Uzito.csv").exists());

    let out = run(
        dir.path(),
        &["history", "--email", "asha@example.com", "--history-dir", history_arg, "--json"],
    );
    assert_success(&out);
    let rows = json(&out);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["goal"], "Kupunguza Uzito");
    assert_eq!(rows[0]["food"], "Muhogo");
    assert_eq!(rows[0]["protein_g"], 10.0);
    assert!(rows[0]["rating"].is_null());

    let out = run(
        dir.path(),
        &[
            "rate", "-g", "Kupunguza Uzito", "--email", "asha@example.com",
            "--rating", "3", "--delay-days", "0", "--history-dir", history_arg,
        ],
    );
    assert_success(&out);
    assert!(stdout(&out).contains("rated 2 recommendation(s)"));

    let out = run(
        dir.path(),
        &["history", "--email", "ASHA@example.com", "--history-dir", history_arg, "--json"],
    );
    let rows = json(&out);
    assert!(rows.as_array().unwrap().iter().all(|r| r["rating"] == 3));

    // Already rated: nothing left to do, still a success
    let out = run(
        dir.path(),
        &[
            "rate", "-g", "Kupunguza Uzito", "--email", "asha@example.com",
            "--rating", "1", "--delay-days", "0", "--history-dir", history_arg,
        ],
    );
    assert_success(&out);
    assert!(stderr(&out).contains("nothing to rate"));
}

#[test]
fn rate_respects_delay_days() {
    let dir = workspace();
    let history = dir.path().join("h");
    let history_arg = history.to_str().unwrap();

    let out = run(
        dir.path(),
        &["recommend", "-g", "Kudhibiti Sukari", "-G", "B1", "--log", "--history-dir", history_arg],
    );
    assert_success(&out);

    let out = run(
        dir.path(),
        &[
            "rate", "-g", "Kudhibiti Sukari", "--email", "guest", "--rating", "4",
            "--delay-days", "7", "--history-dir", history_arg,
        ],
    );
    assert_success(&out);
    assert!(stderr(&out).contains("nothing to rate"));
}

#[test]
fn history_enabled_in_settings_logs_without_flag() {
    let dir = workspace();
    fs::write(
        dir.path().join("settings.json"),
        r#"{
    // log every run
    "history.enabled": true,
    "history.dir": "runs"
}"#,
    )
    .unwrap();

    let out = run(dir.path(), &["recommend", "-g", "Kupunguza Uzito", "-G", "D1"]);
    assert_success(&out);
    assert!(dir.path().join("runs/Kupunguza_Uzito.csv").exists());
}

#[test]
fn rate_waits_one_day_by_default() {
    let dir = workspace();
    let history = dir.path().join("h");
    let history_arg = history.to_str().unwrap();

    let out = run(
        dir.path(),
        &["recommend", "-g", "Kupunguza Uzito", "-G", "B1", "--log", "--history-dir", history_arg],
    );
    assert_success(&out);

    let out = run(
        dir.path(),
        &["rate", "-g", "Kupunguza Uzito", "--email", "guest", "--rating", "2", "--history-dir", history_arg],
    );
    assert_success(&out);
    assert!(stderr(&out).contains("older than 1 day(s)"));
}

#[test]
fn unknown_goal_is_not_logged() {
    let dir = workspace();
    let history = dir.path().join("h");
    let out = run(
        dir.path(),
        &[
            "recommend", "-g", "Kupunguza Uzit", "-G", "B1", "--log",
            "--history-dir", history.to_str().unwrap(), "--json",
        ],
    );
    assert_success(&out);
    assert!(json(&out).get("history_file").is_none());
    assert!(!history.join("Kupunguza_Uzit.csv").exists());
}

#[test]
fn goal_naming_a_path_is_rejected() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &["rate", "-g", "../outside", "--email", "a@b.c", "--rating", "2", "--history-dir", "h"],
    );
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("cannot be used as a history file name"));
    assert!(!dir.path().join("outside.csv").exists());
}

#[test]
fn rating_out_of_range_is_rejected() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &["rate", "-g", "Kupunguza Uzito", "--email", "a@b.c", "--rating", "5"],
    );
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn history_for_unknown_user_is_empty() {
    let dir = workspace();
    let out = run(dir.path(), &["history", "--email", "nobody@example.com", "--json"]);
    assert_success(&out);
    assert_eq!(json(&out), serde_json::json!([]));
}

// ===========================================================================
// catalog / goals / groups
// ===========================================================================

#[test]
fn goals_json_lists_builtin_goals() {
    let dir = workspace();
    let out = run(dir.path(), &["goals", "--json"]);
    assert_success(&out);
    let val = json(&out);
    assert_eq!(val.as_object().unwrap().len(), 10);
    assert_eq!(val["Kudhibiti Sukari"]["fields"], serde_json::json!(["CHOCDF", "SUCS", "FIB"]));
}

#[test]
fn groups_text_shows_ranges() {
    let dir = workspace();
    let out = run(dir.path(), &["groups"]);
    assert_success(&out);
    let text = stdout(&out);
    assert_eq!(text.lines().count(), 14);
    let d1 = text.lines().find(|l| l.starts_with("D1")).unwrap();
    assert!(d1.contains("Nyama, Kuku, Samaki"));
    assert!(d1.ends_with("201-250, 301-350"));
}

#[test]
fn catalog_validate_rejects_overlap() {
    let dir = workspace();
    let catalog = dir.path().join("overlap.toml");
    fs::write(
        &catalog,
        r#"
name = "Bad"

[groups.X]
ranges = [[1, 10], [5, 20]]
"#,
    )
    .unwrap();

    let out = run(dir.path(), &["catalog", "validate", catalog.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("overlaps"));
}

#[test]
fn catalog_show_round_trips_through_validate() {
    let dir = workspace();
    let out = run(dir.path(), &["catalog", "show"]);
    assert_success(&out);

    let path = dir.path().join("shown.toml");
    fs::write(&path, stdout(&out)).unwrap();
    let out = run(dir.path(), &["catalog", "validate", path.to_str().unwrap()]);
    assert_success(&out);
    assert!(stdout(&out).starts_with("ok: Vyakula vya Tanzania (14 groups, 10 goals)"));
}

// ===========================================================================
// metrics / settings
// ===========================================================================

#[test]
fn metrics_json() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &["metrics", "--weight", "60", "--height", "1.7", "--age", "25", "--json"],
    );
    assert_success(&out);
    let val = json(&out);
    assert_eq!(val["metrics"]["bmi"], 20.76);
    assert_eq!(val["metrics"]["bmr"], 1542.5);
    assert_eq!(val["metrics"]["tdee"], 2390.88);
    assert_eq!(val["profile"]["sex"], "M");
}

#[test]
fn metrics_female_swahili_activity() {
    let dir = workspace();
    let out = run(
        dir.path(),
        &[
            "metrics", "--weight", "60", "--height", "1.7", "--age", "25",
            "--sex", "F", "--activity", "Bila Harakati",
        ],
    );
    assert_success(&out);
    let text = stdout(&out);
    assert!(text.contains("BMR:  1376.5 kcal/day"));
    assert!(text.contains("TDEE: 1651.8 kcal/day"));
}

#[test]
fn metrics_requires_measurements() {
    let dir = workspace();
    let out = run(dir.path(), &["metrics"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("hint:"));
}

#[test]
fn settings_init_then_show() {
    let dir = workspace();
    let path = dir.path().join("fresh/settings.json");
    let path_arg = path.to_str().unwrap();

    let out = run(dir.path(), &["settings", "init", "--settings", path_arg]);
    assert_success(&out);
    assert!(path.exists());

    let out = run(dir.path(), &["settings", "init", "--settings", path_arg]);
    assert_eq!(out.status.code(), Some(2));

    let out = run(dir.path(), &["settings", "show", "--json", "--settings", path_arg]);
    assert_success(&out);
    let val = json(&out);
    assert_eq!(val["path"], path_arg);
    assert_eq!(val["settings"]["recommend.topN"], 5);
    assert_eq!(val["settings"]["history.enabled"], false);
}

#[test]
fn no_subcommand_prints_usage() {
    let dir = workspace();
    let out = run(dir.path(), &[]);
    assert_success(&out);
    assert!(stderr(&out).contains("Usage: lishe"));
}
