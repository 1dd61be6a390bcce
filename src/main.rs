//! Atlas CLI - index a project, then search it for duplicates and task context

use atlas::retriever::{check_drift, find_duplicates, DuplicateReport, PackMode, PackRequest, Packer};
use atlas::storage::{IndexStore, SqliteStore};
use atlas::ui::{self, Icons};
use atlas::{Indexer, ProjectLayout, TracingDiagnostics};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "atlas")]
#[command(version)]
#[command(about = "Local code-intelligence index - duplicate search and task context packing")]
#[command(long_about = r#"
Atlas keeps a heuristic symbol index of a TypeScript/JavaScript/Python project
under .atlas/ and answers questions against it:
  • Is there already something that does X?
  • Which files matter for this task, within a size budget?
  • Has the public API drifted from the approved snapshot?

Example usage:
  atlas index
  atlas find-duplicates --intent "parse user config"
  atlas pack --task "fix login redirect" --budget 20000
  atlas check
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Project root
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the project, re-parsing only changed files
    Index,

    /// Build a context pack for a task and write it to the pack artifact
    Pack {
        /// Task description
        #[arg(short, long)]
        task: String,

        /// Character budget (defaults to the configured budget)
        #[arg(short, long)]
        budget: Option<usize>,

        /// bugfix, feature or refactor
        #[arg(short, long, default_value = "feature")]
        mode: PackMode,
    },

    /// Find existing symbols matching an intent, or duplicated symbols when no intent is given
    FindDuplicates {
        /// Intent description
        #[arg(short, long, default_value = "")]
        intent: String,
    },

    /// Compare the public API manifest with the approved snapshot
    Check,

    /// Remove index rows for files that were deleted or are now ignored
    Prune,

    /// Show statistics about the index
    Stats,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    let output = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let layout = ProjectLayout::discover(&cli.root)?;

    match cli.command {
        Commands::Index => run_index(layout, output),
        Commands::Pack { task, budget, mode } => {
            let budget = budget.unwrap_or(layout.config().default_budget);
            run_pack(layout, PackRequest::new(task, budget).with_mode(mode), output)
        }
        Commands::FindDuplicates { intent } => run_find_duplicates(layout, &intent, output),
        Commands::Check => run_check(&layout, output),
        Commands::Prune => run_prune(layout, output),
        Commands::Stats => run_stats(layout, output),
    }
}

fn run_index(layout: ProjectLayout, output: OutputMode) -> anyhow::Result<ExitCode> {
    if output.is_human() {
        ui::header(Icons::INDEX, &format!("Indexing {}", layout.root().display()));
    }

    let mut indexer = Indexer::open(layout.clone())?;
    let report = indexer.index()?;

    if !output.is_human() {
        emit_json(&serde_json::json!({
            "new": report.new,
            "modified": report.modified,
            "unchanged": report.unchanged,
            "skipped": report.skipped,
            "scanned": report.scanned(),
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    for (path, status) in &report.files {
        ui::file_status(path, *status);
    }
    ui::section("Summary");
    ui::summary_row("Scanned", &report.scanned().to_string());
    ui::summary_row("New", &report.new.to_string());
    ui::summary_row("Modified", &report.modified.to_string());
    ui::summary_row("Unchanged", &report.unchanged.to_string());
    if report.skipped > 0 {
        ui::warn(&format!("{} entries could not be read", report.skipped));
    }
    ui::status(Icons::DATABASE, "Database", &layout.database_path().display().to_string());
    ui::success("Indexing complete");
    Ok(ExitCode::SUCCESS)
}

fn run_pack(layout: ProjectLayout, request: PackRequest, output: OutputMode) -> anyhow::Result<ExitCode> {
    let artifact = layout.pack_output_path();
    let packer = Packer::open(layout)?;
    let pack = packer.pack(&request)?;

    if !output.is_human() {
        emit_json(&pack)?;
        return Ok(ExitCode::SUCCESS);
    }

    ui::header(Icons::PACKAGE, &format!("Context pack for \"{}\"", pack.task));
    let table = ui::pack_table(&pack.files);
    if table.is_empty() {
        ui::warn("No files matched within the budget");
    } else {
        println!("{}", table);
    }
    ui::summary_row(
        "Characters",
        &format!("{} / {}", pack.stats.total_chars, pack.stats.budget),
    );
    ui::summary_row("Seed symbols", &pack.stats.total_symbols.to_string());
    ui::success(&format!("Packed {} files into {}", pack.stats.total_files, artifact.display()));
    Ok(ExitCode::SUCCESS)
}

fn run_find_duplicates(layout: ProjectLayout, intent: &str, output: OutputMode) -> anyhow::Result<ExitCode> {
    let store = SqliteStore::open(&layout.database_path())?;
    let report = find_duplicates(&store, intent)?;

    if !output.is_human() {
        emit_json(&report)?;
        return Ok(ExitCode::SUCCESS);
    }

    let (title, table) = match &report {
        DuplicateReport::Matches(rows) => (format!("Symbols matching \"{}\"", intent), ui::matches_table(rows)),
        DuplicateReport::Groups(groups) => ("Duplicated symbols".to_string(), ui::groups_table(groups)),
    };
    ui::header(Icons::SEARCH, &title);
    if report.is_empty() {
        println!("{}", ui::dim("Nothing found."));
    } else {
        println!("{}", table);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(layout: &ProjectLayout, output: OutputMode) -> anyhow::Result<ExitCode> {
    let result = check_drift(layout, &TracingDiagnostics);

    if output.is_human() {
        match &result.reason {
            None => ui::success("Checks passed."),
            Some(reason) => ui::failure(&format!("Check failed: {}", reason)),
        }
    } else {
        emit_json(&result)?;
    }

    Ok(if result.passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run_prune(layout: ProjectLayout, output: OutputMode) -> anyhow::Result<ExitCode> {
    let mut indexer = Indexer::open(layout)?;
    let removed = indexer.prune()?;

    if !output.is_human() {
        emit_json(&removed)?;
        return Ok(ExitCode::SUCCESS);
    }

    for path in &removed {
        ui::file_removed(path);
    }
    ui::success(&format!("Pruned {} files", removed.len()));
    Ok(ExitCode::SUCCESS)
}

fn run_stats(layout: ProjectLayout, output: OutputMode) -> anyhow::Result<ExitCode> {
    let store = SqliteStore::open(&layout.database_path())?;
    let stats = store.stats()?;
    let languages = store.language_stats()?;

    if !output.is_human() {
        emit_json(&serde_json::json!({ "stats": stats, "languages": languages }))?;
        return Ok(ExitCode::SUCCESS);
    }

    ui::header(Icons::STATS, &format!("Atlas Statistics ({})", layout.database_path().display()));
    println!("{}", ui::stats_table(&stats));
    for language in &languages {
        ui::summary_row(&language.language, &language.count.to_string());
    }
    Ok(ExitCode::SUCCESS)
}
