use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use clap::{Args, Parser, Subcommand};

use planlector::types::book::{parse_weekday, Book};

/// Reading plans exported as iCalendar, plus curated reading content.
#[derive(Debug, Parser)]
#[command(name = "planlector", version, about)]
pub struct Cli {
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to the platform config dir).
    #[arg(long, global = true, env = "PLANLECTOR_CONFIG")]
    pub config: Option<String>,

    /// Directory with `<locale>.json` translation files.
    #[arg(long, global = true, env = "PLANLECTOR_LOCALES")]
    pub locales: Option<PathBuf>,

    /// Output language for this run (`es` or `en`).
    #[arg(long, global = true)]
    pub lang: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a reading plan and write it as an .ics file.
    Plan(PlanArgs),
    /// Show estimated reading time per book.
    Estimate(ProfileArgs),
    /// Browse published content.
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },
    /// Inspect or change settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Books and reader preferences shared by `plan` and `estimate`.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Book as `title:pages:category` (category: theory, popularization, analysis). Repeatable.
    #[arg(short, long = "book", required = true, value_parser = Book::parse_spec)]
    pub books: Vec<Book>,

    /// Relative reading speed (1.0 = configured rates).
    #[arg(long)]
    pub speed: Option<f64>,

    /// Daily reading minutes.
    #[arg(long)]
    pub max_minutes: Option<u32>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Reading days, e.g. `mon,wed,fri` or `lunes,miercoles`.
    #[arg(short, long, value_delimiter = ',', value_parser = parse_weekday)]
    pub weekdays: Option<Vec<Weekday>>,

    /// First day of the plan (YYYY-MM-DD, default today).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day for study sessions (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Output file (default `plan_lectura_<start>.ics`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ContentAction {
    /// List published documents.
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show one published document chosen at random.
    Random,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current settings as JSON.
    Show,
    /// Set a value by dot-notation key, e.g. `schedule.max_session_minutes 90`.
    Set { key: String, value: String },
    /// Restore the defaults.
    Reset,
}
