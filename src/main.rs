use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repokeeper::catalog::build_report;
use repokeeper::exec::{render_template, CommandRunner, SystemRunner};
use repokeeper::format::{format_row, separator_line, Console};
use repokeeper::platform::Platform;
use repokeeper::reconcile::ReconciledRepository;
use repokeeper::{Config, ReconcileReport, Status, SyncEngine};

#[derive(Parser)]
#[command(name = "repokeeper")]
#[command(about = "Declarative catalog of local git repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories by category with their local status
    List {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,

        /// Only show repositories with this status
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a repository with the configured open command
    Open {
        /// Repository name
        name: String,

        /// Open the repository's web page instead
        #[arg(long)]
        web: bool,
    },

    /// Open the configuration file in a text editor
    Config {
        /// Only print the configuration file path
        #[arg(long)]
        print_path: bool,
    },

    /// Clone missing and pull present repositories marked `sync: true`
    Sync {
        /// Show what would be done without running git
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum StatusFilter {
    Present,
    Missing,
    Untracked,
}

impl From<StatusFilter> for Status {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Present => Status::Present,
            StatusFilter::Missing => Status::Missing,
            StatusFilter::Untracked => Status::Untracked,
        }
    }
}

/// How a command finished; turned into output and an exit code by `main`
enum Outcome {
    /// Output already printed
    Done,
    Success(String),
    Failure(String),
}

const NAME_WIDTH: usize = 28;
const STATUS_WIDTH: usize = 9;
const SOURCE_WIDTH: usize = 6;
const SYNC_WIDTH: usize = 4;
const PATH_WIDTH: usize = 60;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("failed to initialize logging: {:#}", e);
    }

    match run(cli).await {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Success(message)) => {
            println!("{}", format!("SUCCESS: {}", message).green());
            ExitCode::SUCCESS
        }
        Ok(Outcome::Failure(message)) => {
            eprintln!("{}", format!("ERROR: {}", message).red());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", format!("ERROR: {:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging based on verbosity level; stdout is left for tables
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;

    Ok(())
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = load_config(cli.config)?;
    info!("Using configuration {}", config.source.display());

    match cli.command {
        Commands::List {
            category,
            status,
            json,
        } => cmd_list(&config, category, status.map(Status::from), json),
        Commands::Open { name, web } => cmd_open(&config, &name, web).await,
        Commands::Config { print_path } => cmd_config(&config, print_path).await,
        Commands::Sync { dry_run } => cmd_sync(&config, dry_run).await,
    }
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Print the categorized repository tables
fn cmd_list(
    config: &Config,
    category: Option<String>,
    status: Option<Status>,
    json: bool,
) -> Result<Outcome> {
    let mut report = build_report(config)?;

    report
        .repositories
        .retain(|entry| keep_entry(entry, category.as_deref(), status));
    if category.is_some() || matches!(status, Some(Status::Present | Status::Missing)) {
        report.untracked.clear();
    }

    if json {
        let rendered = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", rendered);
        return Ok(Outcome::Done);
    }

    print_report(config, &report, status)?;
    Ok(Outcome::Done)
}

fn keep_entry(entry: &ReconciledRepository, category: Option<&str>, status: Option<Status>) -> bool {
    let category_ok = match category {
        Some(wanted) => entry.repository.category.as_deref() == Some(wanted),
        None => true,
    };
    let status_ok = match status {
        Some(wanted) => entry.status == wanted,
        None => true,
    };
    category_ok && status_ok
}

fn print_report(config: &Config, report: &ReconcileReport, status: Option<Status>) -> Result<()> {
    let mut console = Console::stdout();
    let widths = [NAME_WIDTH, STATUS_WIDTH, SOURCE_WIDTH, SYNC_WIDTH, PATH_WIDTH];

    if status != Some(Status::Untracked) {
        for (category, entries) in report.by_category() {
            console.line("")?;
            console.line(&format!(
                "{} ({})",
                category.unwrap_or("uncategorized"),
                entries.len()
            ))?;
            console.line(&format_row(&["name", "status", "source", "sync", "path"], &widths))?;
            console.line(&separator_line(&widths))?;

            for entry in entries {
                let path = entry
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let sync = if entry.repository.sync { "yes" } else { "no" };
                console.line(&format_row(
                    &[
                        entry.repository.name.as_str(),
                        entry.status.as_str(),
                        entry.repository.source.kind(),
                        sync,
                        path.as_str(),
                    ],
                    &widths,
                ))?;
            }
        }
    }

    if !report.untracked.is_empty() {
        let untracked_widths = [NAME_WIDTH, PATH_WIDTH];
        console.line("")?;
        console.line(&format!("untracked ({})", report.untracked.len()))?;
        console.line(&format_row(&["name", "path"], &untracked_widths))?;
        console.line(&separator_line(&untracked_widths))?;
        for folder in &report.untracked {
            let path = folder.path.display().to_string();
            console.line(&format_row(&[folder.name.as_str(), path.as_str()], &untracked_widths))?;
        }
    }

    for issue in &report.issues {
        console.line(&format!("{}", format!("warning: {}", issue).yellow()))?;
    }

    console.line("")?;
    console.line(&format!(
        "{} present, {} missing, {} untracked under {}",
        report.count(Status::Present),
        report.count(Status::Missing),
        report.count(Status::Untracked),
        config.root.display()
    ))?;

    Ok(())
}

/// Open a repository locally or in the browser
async fn cmd_open(config: &Config, name: &str, web: bool) -> Result<Outcome> {
    let report = build_report(config)?;
    let entry = report
        .find(name)
        .ok_or_else(|| anyhow!("Repository '{}' is not in the configuration", name))?;
    let platform = Platform::current()?;

    if web {
        let url = entry
            .repository
            .web_url()
            .ok_or_else(|| anyhow!("Repository '{}' has no web URL; set `link`", name))?;
        SystemRunner.run(&platform.open_url(&url)).await?;
        return Ok(Outcome::Success(format!("opened {}", url)));
    }

    let path = match (&entry.status, &entry.path) {
        (Status::Present, Some(path)) => path,
        _ => bail!(
            "Repository '{}' is not cloned under {}; run `repokeeper sync`",
            name,
            config.root.display()
        ),
    };

    let line = render_template(&config.manifest.open_command.repository, name, path);
    SystemRunner
        .run(&platform.shell(&line))
        .await
        .with_context(|| format!("Failed to open repository '{}'", name))?;

    Ok(Outcome::Success(format!("opened {}", path.display())))
}

/// Open or locate the configuration file
async fn cmd_config(config: &Config, print_path: bool) -> Result<Outcome> {
    if print_path {
        println!("{}", config.source.display());
        return Ok(Outcome::Done);
    }

    let platform = Platform::current()?;
    SystemRunner.run(&platform.open_text_file(&config.source)).await?;

    Ok(Outcome::Success(format!("opened {}", config.source.display())))
}

/// Clone or pull every repository marked for sync
async fn cmd_sync(config: &Config, dry_run: bool) -> Result<Outcome> {
    let report = build_report(config)?;
    let engine = SyncEngine::new(SystemRunner, &config.root);
    let tasks = engine.plan(&report);

    if tasks.is_empty() {
        return Ok(Outcome::Success("nothing to sync".to_string()));
    }

    let mut console = Console::stdout();

    if dry_run {
        for task in &tasks {
            console.line(&format!("{}: {}", task.name, task.action))?;
        }
        return Ok(Outcome::Success(format!("{} repositories would be synced", tasks.len())));
    }

    let summary = engine
        .run(&tasks, |position, total, task| {
            // Progress output is best effort.
            let _ = console.update_line(&format!("[{}/{}] {}", position, total, task.action));
        })
        .await;
    console.finish_live()?;

    for (name, error) in summary.failures() {
        console.line(&format!("{}", format!("{}: {}", name, error).red()))?;
    }

    let message = format!(
        "{} synced, {} failed in {:.2}s",
        summary.successful_operations,
        summary.failed_operations,
        summary.duration.as_secs_f64()
    );

    if summary.failed_operations > 0 {
        Ok(Outcome::Failure(message))
    } else {
        Ok(Outcome::Success(message))
    }
}
