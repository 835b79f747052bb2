// Lishe CLI - headless food recommendations

mod digest;
mod exit_codes;
mod history;
mod recommend;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use lishe_config::Settings;
use lishe_io::IoError;
use lishe_recommend::metrics::{ActivityLevel, BodyProfile, Sex};
use lishe_recommend::{Catalog, RecommendError};

use exit_codes::*;
use recommend::RecommendOptions;

#[derive(Parser)]
#[command(name = "lishe")]
#[command(about = "Nutrient-based food recommendations (CLI mode, headless)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Settings file (default: <config dir>/lishe/settings.json)
    #[arg(long, global = true, env = "LISHE_SETTINGS", value_name = "PATH")]
    settings: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug); LISHE_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank foods within food groups for a health goal
    #[command(after_help = "\
Examples:
  lishe recommend --goal 'Kupunguza Uzito' --group B1 --top 3
  lishe recommend -g 'Kudhibiti Sukari' -G B1 -G 'Mboga' --data VYAKULA.csv --json
  lishe recommend -g 'Kuongeza Misuli' -G D1 --weight 70 --height 1.75 --age 30 --log --email asha@example.com
  lishe recommend -g 'Kupunguza Uzito' -G B1 -G F3 --digest items")]
    Recommend {
        /// Health goal label (see `lishe goals`)
        #[arg(long, short = 'g')]
        goal: String,

        /// Food group key or label; repeat for several
        #[arg(long = "group", short = 'G', value_name = "GROUP")]
        groups: Vec<String>,

        /// Foods per group [default: "recommend.topN" from settings]
        #[arg(long, short = 'n')]
        top: Option<usize>,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        history: HistoryArgs,

        #[command(flatten)]
        body: BodyArgs,

        /// Append the recommended foods to the history log
        #[arg(long)]
        log: bool,

        /// User recorded in the history log (default: guest)
        #[arg(long)]
        email: Option<String>,

        /// Name used to greet the user in per-food digests
        #[arg(long)]
        name: Option<String>,

        /// Print an email-ready digest: one for the run, or one per food
        #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "run")]
        digest: Option<DigestMode>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List health goals and the nutrient fields each one sums
    Goals {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List food groups with their labels and code ranges
    Groups {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate or print a catalog of food groups and goals
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Compute BMI, BMR (Mifflin-St Jeor) and TDEE
    #[command(after_help = "\
Examples:
  lishe metrics --weight 60 --height 1.7 --age 25
  lishe metrics --weight 60 --height 1.7 --age 25 --sex F --activity 'Bila Harakati' --json")]
    Metrics {
        #[command(flatten)]
        body: BodyArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a user's recommendation history across all goals
    History {
        /// User email (case-insensitive)
        #[arg(long)]
        email: String,

        /// Only this goal
        #[arg(long, short = 'g')]
        goal: Option<String>,

        #[command(flatten)]
        history: HistoryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rate past recommendations for a goal (0 = bad .. 4 = excellent)
    #[command(after_help = "\
Only unrated rows at least --delay-days old are updated (default: 1 day, so
today's recommendations are rated after they have been tried).

Examples:
  lishe rate --goal 'Kupunguza Uzito' --email asha@example.com --rating 3
  lishe rate -g 'Kudhibiti Sukari' --email asha@example.com --rating 4 --delay-days 7
  lishe rate -g 'Kudhibiti Sukari' --email asha@example.com --rating 2 --delay-days 0")]
    Rate {
        /// Health goal label
        #[arg(long, short = 'g')]
        goal: String,

        /// User email (case-insensitive)
        #[arg(long)]
        email: String,

        /// Rating from 0 to 4
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
        rating: u8,

        /// Minimum age in days of the rows to rate
        #[arg(long, default_value_t = 1)]
        delay_days: u32,

        #[command(flatten)]
        history: HistoryArgs,
    },

    /// Show or create the settings file
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Parse and validate a catalog file
    Validate {
        /// Catalog TOML file
        file: PathBuf,
    },

    /// Print the effective catalog as TOML
    Show {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the settings path and effective values
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DigestMode {
    /// One message listing every recommended food
    Run,
    /// One message per recommended food
    Items,
}

#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Food composition table (CSV) [default: "data.foodTable" from settings]
    #[arg(long, env = "LISHE_DATA", value_name = "CSV")]
    data: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CatalogArgs {
    /// Catalog of groups and goals (TOML) [default: built-in]
    #[arg(long, env = "LISHE_CATALOG", value_name = "TOML")]
    catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct HistoryArgs {
    /// History directory [default: "history.dir" from settings]
    #[arg(long, env = "LISHE_HISTORY_DIR", value_name = "DIR")]
    history_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct BodyArgs {
    /// Weight in kilograms
    #[arg(long, value_name = "KG")]
    weight: Option<f64>,

    /// Height in metres
    #[arg(long, value_name = "M")]
    height: Option<f64>,

    /// Age in years
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=130))]
    age: Option<u32>,

    /// M or F
    #[arg(long, default_value = "M")]
    sex: String,

    /// Sedentary, Light, Moderate, "Very Active" or "Extra Active" (Swahili labels accepted)
    #[arg(long, default_value = "Moderate")]
    activity: String,
}

impl BodyArgs {
    /// `None` when no body measurements were given at all.
    fn profile(&self) -> Result<Option<BodyProfile>, CliError> {
        let (weight_kg, height_m, age) = match (self.weight, self.height, self.age) {
            (None, None, None) => return Ok(None),
            (Some(w), Some(h), Some(a)) => (w, h, a),
            _ => {
                return Err(CliError::usage("--weight, --height and --age must be given together"))
            }
        };

        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(CliError::usage(format!(
                "--weight must be a positive number of kilograms, got {weight_kg}"
            )));
        }
        if !height_m.is_finite() || height_m <= 0.0 {
            return Err(CliError::usage(format!(
                "--height must be a positive number of metres, got {height_m}"
            )));
        }
        if height_m > 3.0 {
            return Err(CliError::usage(format!("--height {height_m} is out of range"))
                .with_hint("height is in metres, e.g. --height 1.75"));
        }

        Ok(Some(BodyProfile {
            weight_kg,
            height_m,
            age,
            sex: Sex::parse(&self.sex),
            activity: ActivityLevel::parse(&self.activity),
        }))
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  lishe-recommend ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: lishe <command> [options]");
            eprintln!("       lishe --help for more information");
            Ok(())
        }
        Some(command) => run(command, cli.settings.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

/// Logs go to stderr so stdout stays parseable. `log` records from the
/// library crates are bridged into the subscriber.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("LISHE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(command: Commands, settings_path: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(settings_path);

    match command {
        Commands::Recommend {
            goal,
            groups,
            top,
            data,
            catalog,
            history,
            body,
            log,
            email,
            name,
            digest,
            json,
        } => {
            let logging = log || settings.history_enabled;
            let options = RecommendOptions {
                goal,
                groups,
                top_n: top.unwrap_or(settings.top_n),
                table: data.data.unwrap_or_else(|| settings.food_table.clone()),
                catalog: catalog.catalog.or_else(|| settings.catalog.clone()),
                history_dir: logging.then(|| history_dir(&history, &settings)),
                email,
                name,
                profile: body.profile()?,
                digest,
                json,
            };
            recommend::cmd_recommend(options)
        }
        Commands::Goals { catalog, json } => {
            let catalog = load_catalog(catalog.catalog.as_deref().or(settings.catalog.as_deref()))?;
            cmd_goals(&catalog, json)
        }
        Commands::Groups { catalog, json } => {
            let catalog = load_catalog(catalog.catalog.as_deref().or(settings.catalog.as_deref()))?;
            cmd_groups(&catalog, json)
        }
        Commands::Catalog { command } => match command {
            CatalogCommands::Validate { file } => cmd_catalog_validate(&file),
            CatalogCommands::Show { catalog } => {
                let catalog =
                    load_catalog(catalog.catalog.as_deref().or(settings.catalog.as_deref()))?;
                cmd_catalog_show(&catalog)
            }
        },
        Commands::Metrics { body, json } => cmd_metrics(&body, json),
        Commands::History {
            email,
            goal,
            history,
            json,
        } => history::cmd_history(&history_dir(&history, &settings), &email, goal.as_deref(), json),
        Commands::Rate {
            goal,
            email,
            rating,
            delay_days,
            history,
        } => history::cmd_rate(&history_dir(&history, &settings), &goal, &email, rating, delay_days),
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&settings, settings_path, json),
            SettingsCommands::Init { force } => cmd_settings_init(settings_path, force),
        },
    }
}

// ============================================================================
// Loading
// ============================================================================

fn load_settings(path: Option<&Path>) -> Settings {
    match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

fn history_dir(args: &HistoryArgs, settings: &Settings) -> PathBuf {
    args.history_dir
        .clone()
        .unwrap_or_else(|| settings.history_dir.clone())
}

/// Catalog from a TOML file, or the built-in one.
fn load_catalog(path: Option<&Path>) -> Result<Catalog, CliError> {
    let Some(path) = path else {
        return Catalog::builtin().map_err(CliError::from);
    };
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::catalog(format!("cannot read {}: {}", path.display(), e)))?;
    Catalog::from_toml(&text)
        .map_err(|e| CliError::catalog(format!("{}: {}", path.display(), e)))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::error(format!("cannot serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// Catalog commands
// ============================================================================

fn cmd_goals(catalog: &Catalog, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(&catalog.goals);
    }
    for (label, goal) in &catalog.goals {
        println!("{}: {}", label, goal.fields.join(", "));
    }
    Ok(())
}

fn cmd_groups(catalog: &Catalog, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(&catalog.groups);
    }
    for (key, group) in &catalog.groups {
        let ranges: Vec<String> = group.ranges.iter().map(|r| r.to_string()).collect();
        println!("{:<4} {:<36} {}", key, group.label, ranges.join(", "));
    }
    Ok(())
}

fn cmd_catalog_validate(file: &Path) -> Result<(), CliError> {
    let catalog = load_catalog(Some(file))?;
    println!(
        "ok: {} ({} groups, {} goals)",
        catalog.name,
        catalog.groups.len(),
        catalog.goals.len()
    );
    Ok(())
}

fn cmd_catalog_show(catalog: &Catalog) -> Result<(), CliError> {
    let toml = catalog.to_toml().map_err(CliError::from)?;
    print!("{}", toml);
    Ok(())
}

// ============================================================================
// Metrics / settings
// ============================================================================

fn cmd_metrics(body: &BodyArgs, json: bool) -> Result<(), CliError> {
    let profile = body.profile()?.ok_or_else(|| {
        CliError::usage("--weight, --height and --age are required")
            .with_hint("lishe metrics --weight 60 --height 1.7 --age 25")
    })?;
    let metrics = profile.metrics();

    if json {
        return print_json(&serde_json::json!({
            "profile": profile,
            "metrics": metrics,
        }));
    }
    println!("BMI:  {}", metrics.bmi);
    println!("BMR:  {} kcal/day", metrics.bmr);
    println!("TDEE: {} kcal/day", metrics.tdee);
    Ok(())
}

fn cmd_settings_show(settings: &Settings, path: Option<&Path>, json: bool) -> Result<(), CliError> {
    let path = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(Settings::config_path_display);

    if json {
        return print_json(&serde_json::json!({
            "path": path,
            "settings": settings,
        }));
    }
    println!("# {}", path);
    print_json(settings)
}

fn cmd_settings_init(path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Settings::config_path);
    if path.exists() && !force {
        return Err(CliError::usage(format!("{} already exists", path.display()))
            .with_hint("use --force to overwrite it with defaults"));
    }
    Settings::default()
        .save_to(&path)
        .map_err(|e| CliError::error(format!("cannot write {}: {}", path.display(), e)))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::new(EXIT_CATALOG, msg)
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, msg)
    }

    pub fn history(msg: impl Into<String>) -> Self {
        Self::new(EXIT_HISTORY, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Error while loading the food table.
    pub fn from_table(err: IoError) -> Self {
        match err {
            IoError::Table(inner) => inner.into(),
            IoError::Read { .. } => Self::data(err.to_string())
                .with_hint("set --data, LISHE_DATA or \"data.foodTable\" in settings"),
            other => Self::data(other.to_string()),
        }
    }

    /// Error while reading or writing the history log.
    pub fn from_history(err: IoError) -> Self {
        match err {
            IoError::InvalidRating(_) | IoError::InvalidGoal(_) => Self::usage(err.to_string()),
            other => Self::history(other.to_string()),
        }
    }
}

impl From<RecommendError> for CliError {
    fn from(err: RecommendError) -> Self {
        let message = err.to_string();
        match err {
            RecommendError::NoGroupSelected => Self::new(EXIT_NO_GROUP, message)
                .with_hint("pass --group <KEY>; `lishe groups` lists them"),
            RecommendError::InvalidCount => Self::usage(message),
            RecommendError::CatalogParse(_)
            | RecommendError::CatalogValidation(_)
            | RecommendError::OverlappingRanges { .. } => Self::catalog(message),
            RecommendError::MissingColumn(_) | RecommendError::Csv(_) => Self::data(message),
        }
    }
}
