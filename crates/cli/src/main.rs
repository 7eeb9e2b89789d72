//! git-smash command-line tool.
//!
//! Rebuilds the current branch from a fresh base by replaying the feature
//! branches merged into it. Actions: `list` shows the merges a replay would
//! apply, `replay` rebuilds the branch, `clean` removes `smash/*` backups.

mod operator;
mod style;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

use gitsmash_core::replay::{ApplyOutcome, Attempt, ReplayReport};
use gitsmash_core::{Action, GitClient, ReplayOptions, Smash, SmashConfig};

use operator::TerminalOperator;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Rebuild a branch by replaying its merged branches onto a fresh base.
#[derive(Parser, Debug)]
#[command(
    name = "git-smash",
    version,
    about = "Rebuild a branch by replaying its merged branches onto a fresh base"
)]
struct Cli {
    /// Action to run: list, replay or clean.
    action: String,

    /// Leave out merges of this branch (repeatable).
    #[arg(long = "drop", value_name = "BRANCH")]
    drop: Vec<String>,

    /// Push the rebuilt branch with --force-with-lease.
    #[arg(long)]
    push: bool,

    /// Delete old smash/ branches instead of asking when the backup name is taken.
    #[arg(long)]
    clean: bool,

    /// Reset onto the base branch tip instead of the merge-base.
    #[arg(long)]
    reset_base: bool,

    /// Base branch to rebuild onto (default from config, else origin/master).
    #[arg(long, value_name = "BRANCH")]
    base: Option<String>,

    /// With `list`, show every merge rather than the latest per branch.
    #[arg(long)]
    all: bool,

    /// Log filter, e.g. `debug` or `gitsmash_core=trace`. Defaults to
    /// `RUST_LOG`, then `info`.
    #[arg(short, long)]
    loglevel: Option<String>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.loglevel.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|e| {
            eprintln!("{}", style::warn(&format!("invalid log level '{}': {}", level, e)));
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        action,
        drop,
        push,
        clean,
        reset_base,
        base,
        all,
        ..
    } = cli;

    let action: Action = action.parse()?;

    let git = GitClient::discover(".").context("not inside a git repository")?;
    let config = load_config(&git, base, clean, push)?;
    let smash = Smash::new(git, config, ReplayOptions { drop, reset_base });

    match action {
        Action::List => cmd_list(&smash, all),
        Action::Clean => cmd_clean(&smash),
        Action::Replay => cmd_replay(&smash),
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn load_config(
    git: &GitClient,
    base: Option<String>,
    clean: bool,
    push: bool,
) -> Result<SmashConfig> {
    let mut config =
        SmashConfig::load(git.repo_path()).context("failed to load configuration")?;

    if let Some(base) = base {
        config.base_branch = base;
    }
    config.clean_backups |= clean;
    config.push |= push;

    config.validate().context("invalid configuration")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Action implementations
// ---------------------------------------------------------------------------

fn cmd_list(smash: &Smash, all: bool) -> Result<()> {
    let merges = smash.list(all).context("failed to list merges")?;

    if merges.is_empty() {
        println!("No merges since {}.", smash.config().base_branch);
        return Ok(());
    }

    println!();
    println!(
        "{}",
        style::header(&format!("Merges since {}", smash.config().base_branch))
    );
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Revision", "Branch", "Message"]);

    for merge in &merges {
        table.add_row(vec![
            Cell::new(style::short_rev(&merge.commit.revision)),
            Cell::new(&merge.merge_branch),
            Cell::new(merge.commit.message.as_deref().unwrap_or("")),
        ]);
    }

    println!("{}", table);
    println!();

    Ok(())
}

fn cmd_clean(smash: &Smash) -> Result<()> {
    let removed = smash.clean().context("failed to clean smash branches")?;

    if removed.is_empty() {
        println!("No smash/ branches to remove.");
        return Ok(());
    }

    for info in &removed {
        println!("{}", style::success(&format!("removed {}", info)));
    }
    Ok(())
}

fn cmd_replay(smash: &Smash) -> Result<()> {
    let mut operator = TerminalOperator::new(smash.config().shell.as_str());
    let report = smash.replay(&mut operator).context("replay failed")?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &ReplayReport) {
    println!();
    println!(
        "{}",
        style::header(&format!("Rebuilt {}", report.current_branch))
    );
    println!();

    if report.steps.is_empty() {
        println!("{}", style::dim("No branches to merge."));
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Merged branch", "Merged from", "Outcome"]);

        for step in &report.steps {
            let outcome = match step.outcome {
                ApplyOutcome::AlreadyMerged => Cell::new("already merged").fg(Color::DarkGrey),
                ApplyOutcome::Merged(Attempt::DirectMerge) => {
                    Cell::new(Attempt::DirectMerge).fg(Color::Green)
                }
                ApplyOutcome::Merged(Attempt::MergeTheMerge) => {
                    Cell::new(Attempt::MergeTheMerge).fg(Color::Yellow)
                }
                ApplyOutcome::Merged(Attempt::Interactive) => {
                    Cell::new(Attempt::Interactive).fg(Color::Magenta)
                }
            };
            table.add_row(vec![
                Cell::new(&step.merge_branch),
                Cell::new(&step.branch),
                outcome,
            ]);
        }

        println!("{}", table);
        println!();
    }

    println!(
        "{}",
        style::success(&format!(
            "{} rebuilt on {}",
            style::branch(&report.current_branch),
            style::short_rev(&report.reset_to)
        ))
    );
    println!(
        "  {}",
        style::dim(&format!("previous state saved to {}", report.backup_branch))
    );
    if report.pushed {
        println!("{}", style::success("pushed"));
    }
}
