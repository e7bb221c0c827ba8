mod commands;
mod core;
mod package;
mod release;
mod utils;

use clap::{Parser, Subcommand};
use core::error::{ReleaseError, print_error};
use package::Target;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cut emsdk releases and package the bundled Python runtime
#[derive(Parser)]
#[command(name = "emsdk-release")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Repository to operate on (default: current directory)
  #[arg(long, global = true, value_name = "PATH")]
  repo: Option<PathBuf>,

  /// Log every subprocess and plan step to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Bump the latest release and commit it on a new release branch
  Promote {
    /// Provenance id of the new release (default: upstream tip of tree)
    provenance: Option<String>,
    /// Show the plan without creating a branch or writing files
    #[arg(long)]
    dry_run: bool,
    /// Output the outcome (or plan) in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Build the bundled Python runtime and upload it to the storage bucket
  PackagePython {
    /// Target to package (repeatable; default: the host's targets)
    #[arg(long = "target", value_enum)]
    targets: Vec<Target>,
    /// Directory to build and cache downloads in (default: current directory)
    #[arg(long, value_name = "DIR")]
    workdir: Option<PathBuf>,
    /// Actually build and upload (default: dry-run mode showing plan)
    #[arg(long)]
    apply: bool,
    /// Output plans in JSON format (useful for CI/automation)
    #[arg(long)]
    json: bool,
  },

  /// Show registry aliases and recent releases
  Status {
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Diagnostics go to stderr; stdout stays for progress lines and JSON
fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let start = match cli.repo {
    Some(path) => path,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(ReleaseError::message(format!("Failed to get current directory: {}", e))),
    },
  };

  // Repository root and release.toml are resolved once for every command
  let ctx = match core::context::RepoContext::build(&start) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Promote {
      provenance,
      dry_run,
      json,
    } => commands::run_promote(&ctx, provenance, dry_run, json),
    Commands::PackagePython {
      targets,
      workdir,
      apply,
      json,
    } => commands::run_package_python(&ctx, targets, workdir, apply, json),
    Commands::Status { json } => commands::run_status(&ctx, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  tracing::debug!(error = ?err, "command failed");
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
