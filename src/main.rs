//! # gopack CLI Entry Point
//!
//! Parses arguments with clap and routes commands to the library.
//!
//! ## Command Structure
//!
//! - **Resolution**: `install`, `validate`
//! - **Inspection**: `stats`, `tree`
//! - **Shell**: `completions`
//! - Anything else is handed to the go tool after an install, with `GOPATH`
//!   pointed at the vendor tree (`gopack build`, `gopack test ./...`).

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing_subscriber::EnvFilter;

use gopack::exec::SystemRunner;
use gopack::project::Project;
use gopack::scm::GO_TOOL;
use gopack::stats::ProjectStats;
use gopack::{tree, ui};

#[derive(Parser)]
#[command(
    name = "gopack",
    about = "Pinned, project-local dependency vendoring for Go",
    version = env!("CARGO_PKG_VERSION")
)]
#[command(allow_external_subcommands = true)]
struct Cli {
    /// Project directory containing gopack.config
    #[arg(long, global = true, env = "GOPACK_DIR", default_value = ".")]
    dir: PathBuf,

    /// Log resolution steps and every command run
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, fetch and pin every dependency (default)
    Install,
    /// Check source imports against declared dependencies without fetching
    Validate,
    /// Show import statistics for the project sources
    Stats,
    /// Show the declared dependency tree and install order
    Tree,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Run the go tool against the vendor tree
    #[command(external_subcommand)]
    External(Vec<String>),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("gopack=debug")
    } else {
        EnvFilter::try_from_env("GOPACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        None | Some(Commands::Install) => {
            install(&cli.dir)?;
            Ok(())
        }
        Some(Commands::Validate) => validate(&cli.dir),
        Some(Commands::Stats) => {
            // plain source analysis, no gopack.config required
            let root = cli
                .dir
                .canonicalize()
                .with_context(|| format!("Project directory {} not found", cli.dir.display()))?;
            ProjectStats::analyze(&root)?.print_summary();
            Ok(())
        }
        Some(Commands::Tree) => {
            let project = Project::load(&cli.dir)?;
            tree::print_tree(&project.graph, project.self_repo());
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::External(args)) => {
            let project = install(&cli.dir)?;
            run_go(&project, args)
        }
    }
}

/// Analyze and validate the sources; print every problem found.
fn check(project: &Project) -> Result<()> {
    let stats = project.analyze()?;
    let errors = project.validate(&stats);
    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("{} {}", "x".red(), err);
    }
    bail!("{} validation error(s)", errors.len())
}

fn validate(dir: &Path) -> Result<()> {
    let project = Project::load(dir)?;
    check(&project)?;
    println!(
        "{} {} dependencies validated",
        "✓".green(),
        project.deps.len()
    );
    Ok(())
}

fn install(dir: &Path) -> Result<Project> {
    let mut project = Project::load(dir)?;
    check(&project)?;

    if project.config_changed() {
        println!("{} {} changed", "•".cyan(), project.config.path.display());
    }

    let pb = ui::spinner(format!("Resolving {} dependencies...", project.deps.len()));
    let report = project.resolve(&SystemRunner);
    pb.finish_and_clear();

    for import in &report.fetched {
        println!("{} Fetched {}", "↓".blue(), import);
    }

    if !report.is_ok() {
        for err in &report.errors {
            eprintln!("{} {}", "x".red(), err);
        }
        bail!("{} dependency error(s)", report.errors.len());
    }

    project.finish(&report)?;
    println!(
        "{} {} dependencies up to date",
        "✓".green(),
        report.resolved.len()
    );
    Ok(project)
}

fn run_go(project: &Project, args: &[String]) -> Result<()> {
    let vendor = project.layout.vendor_dir();
    tracing::debug!(gopath = %vendor.display(), ?args, "running go");

    let status = Command::new(GO_TOOL)
        .args(args)
        .current_dir(project.layout.root())
        .env("GOPATH", &vendor)
        .status()
        .with_context(|| format!("Failed to run {}", GO_TOOL))?;

    if !status.success() {
        bail!("{} {} failed", GO_TOOL, args.join(" "));
    }
    Ok(())
}
