//! planlector command-line interface.
//!
//! Builds reading plans from books given on the command line and writes them
//! as `.ics` files; also browses the content store and edits settings.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use clap::Parser;

use planlector::app::{App, AppPaths};
use planlector::services::calendar_exporter::CalendarExporterTrait;
use planlector::services::content_viewer::ContentViewerTrait;
use planlector::services::localization_engine::{params, LocalizationEngineTrait};
use planlector::services::reading_estimator::ReadingEstimator;
use planlector::services::reading_planner::{describe_error, ReadingPlan};
use planlector::services::settings_engine::SettingsEngineTrait;
use planlector::types::content::{ContentDocument, ContentFilter};
use planlector::types::errors::PlanError;

mod cli;

use cli::{Cli, Commands, ConfigAction, ContentAction, PlanArgs, ProfileArgs};

fn main() {
    if let Err(error) = run() {
        eprintln!("planlector: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut app = App::new(AppPaths {
        settings_path: cli.config.clone(),
        locales_dir: cli.locales.clone(),
        content_store: None,
    })?;
    if let Some(lang) = &cli.lang {
        app.localization_engine
            .set_locale(lang)
            .with_context(|| format!("cannot switch output language to '{}'", lang))?;
    }

    match cli.command {
        Commands::Plan(args) => plan(&app, args),
        Commands::Estimate(args) => estimate(&app, &args),
        Commands::Content { action } => content(&app, action),
        Commands::Config { action } => config(&mut app, action),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PLANLECTOR_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn plan(app: &App, args: PlanArgs) -> anyhow::Result<()> {
    let mut profile = app.profile_with(args.weekdays, args.profile.max_minutes, args.profile.speed);
    if let Some(start) = args.start {
        profile = profile.starting(start);
    }

    let locale = &app.localization_engine;
    let planner = app.planner();
    let plan = planner
        .plan(&args.profile.books, &profile, args.end)
        .map_err(|e| anyhow::anyhow!(describe_error(&e, locale)))?;

    let calendar_name = locale.t(
        "app.calendar_name",
        Some(&params([("year", plan.start_date.year().to_string())])),
    );
    let exporter = app.exporter().with_calendar_name(calendar_name);
    let ics = exporter
        .export(&plan.sessions)
        .map_err(|e| anyhow::anyhow!(describe_error(&PlanError::from(e), locale)))?;

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("plan_lectura_{}.ics", plan.start_date.format("%Y%m%d")))
    });
    fs::write(&output, ics).with_context(|| format!("writing {}", output.display()))?;

    print_summary(locale, &plan);
    println!("{}", output.display());
    Ok(())
}

fn print_summary(locale: &dyn LocalizationEngineTrait, plan: &ReadingPlan) {
    let stats = &plan.stats;
    if stats.total_events == 0 {
        println!("{}", locale.t("plan.no_events", None));
        return;
    }
    println!(
        "{}",
        locale.t(
            "plan.generated",
            Some(&params([("count", stats.total_events.to_string())]))
        )
    );
    println!(
        "{}",
        locale.plural("plan.books_completed", stats.books_completed_count as u64, None)
    );
    println!(
        "{}",
        locale.t(
            "plan.total_hours",
            Some(&params([("hours", format!("{:.2}", stats.total_book_hours))]))
        )
    );
    println!(
        "{}",
        locale.plural("plan.total_days", stats.total_days.unsigned_abs(), None)
    );
    for completion in &plan.completions {
        println!(
            "  {}",
            locale.t(
                "plan.completion_row",
                Some(&params([
                    ("book", completion.title.clone()),
                    ("hours", format!("{:.2}", completion.hours)),
                    ("date", completion.completed_on.to_string()),
                ]))
            )
        );
    }
    if let Some(date) = plan.finished_on() {
        println!(
            "{}",
            locale.t("plan.all_completed_on", Some(&params([("date", date.to_string())])))
        );
    }
    for title in &plan.unfinished {
        println!(
            "{}",
            locale.t("plan.unfinished", Some(&params([("book", title.clone())])))
        );
    }
}

fn estimate(app: &App, args: &ProfileArgs) -> anyhow::Result<()> {
    let locale = &app.localization_engine;
    let profile = app.profile_with(None, args.max_minutes, args.speed);
    let estimates = app
        .planner()
        .estimate_all(&args.books, &profile)
        .map_err(|e| anyhow::anyhow!(describe_error(&e, locale)))?;

    for (book, estimate) in args.books.iter().zip(&estimates) {
        let days = ReadingEstimator::projected_days(estimate.minutes, profile.max_session_minutes)
            .unwrap_or_default();
        println!(
            "{}",
            locale.t(
                "plan.estimate",
                Some(&params([
                    ("book", estimate.title.clone()),
                    ("category", locale.t(book.category.locale_key(), None)),
                    ("minutes", estimate.minutes.to_string()),
                    ("days", format!("{:.1}", days)),
                    ("daily", profile.max_session_minutes.to_string()),
                ]))
            )
        );
    }
    Ok(())
}

fn print_document(locale: &dyn LocalizationEngineTrait, doc: &ContentDocument, with_body: bool) {
    println!(
        "{} ({})",
        doc.title,
        locale.t("content.byline", Some(&params([("author", doc.author.clone())])))
    );
    if with_body {
        println!();
        println!("{}", doc.body);
    }
}

fn content(app: &App, action: ContentAction) -> anyhow::Result<()> {
    let locale = &app.localization_engine;
    let unavailable = || locale.t("errors.content_unavailable", None);

    match action {
        ContentAction::List { category, tag } => {
            let filter = ContentFilter { category, tag };
            let docs = app
                .content_viewer
                .fetch_published(Some(&filter))
                .with_context(unavailable)?;
            if docs.is_empty() {
                println!("{}", locale.t("content.empty", None));
                return Ok(());
            }
            for doc in docs.iter() {
                print_document(locale, doc, false);
            }
            println!("{}", locale.plural("content.count", docs.len() as u64, None));
        }
        ContentAction::Random => match app.content_viewer.fetch_random().with_context(unavailable)? {
            Some(doc) => print_document(locale, &doc, true),
            None => println!("{}", locale.t("content.empty", None)),
        },
    }
    Ok(())
}

fn config(app: &mut App, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(app.settings())?);
        }
        ConfigAction::Set { key, value } => {
            // bare words are taken as strings
            let value = serde_json::from_str::<serde_json::Value>(&value)
                .unwrap_or(serde_json::Value::String(value));
            app.settings_engine
                .set_value(&key, value)
                .with_context(|| format!("setting {}", key))?;
            println!("{}", app.settings_engine.get_config_path());
        }
        ConfigAction::Reset => {
            app.settings_engine.reset()?;
            println!("{}", app.settings_engine.get_config_path());
        }
    }
    Ok(())
}
