use anyhow::{Result, bail};
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::status;
use crate::commands::todo_migrate::{self, TodoMigrateOptions};
use crate::commands::weekly_archive::{self, WeeklyArchiveOptions};
use crate::commands::{CommandContext, CommandReport};
use crate::logging;
use crate::vault::config::{load_config, resolve_config_path};
use crate::vault::locator::parse_date;
use crate::vault::paths::resolve_paths;

#[derive(Debug, Parser)]
#[command(
    name = "vault-upkeep",
    version,
    about = "Daily-note vault upkeep: carry unfinished todos forward and archive past weeks"
)]
pub struct Cli {
    /// Vault root; relative paths resolve against the home directory
    #[arg(long, global = true)]
    pub vault_path: Option<String>,
    /// Config file (defaults to ~/.config/vault-upkeep/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move unfinished todo groups from one daily note into another
    Migrate(MigrateArgs),
    /// Move a week's daily notes and their screenshots into a weekly folder
    Archive(ArchiveArgs),
    /// Show resolved paths and configuration
    Status,
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Source date, YYYY-MM-DD (default: yesterday)
    #[arg(long = "from", value_parser = parse_date_arg)]
    pub source_date: Option<NaiveDate>,
    /// Target date, YYYY-MM-DD (default: today)
    #[arg(long = "to", value_parser = parse_date_arg)]
    pub target_date: Option<NaiveDate>,
    /// Show what would be migrated without changing any note
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ArchiveArgs {
    /// last|previous, current|this, N weeks ago, or a YYYY-MM-DD inside the week
    #[arg(long)]
    pub week: Option<String>,
    /// Show what would be archived without moving files
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(raw).map_err(|err| err.to_string())
}

fn build_context(cli: &Cli) -> Result<CommandContext> {
    let cfg = load_config(cli.config.as_deref())?;
    let paths = resolve_paths(&cfg, cli.vault_path.as_deref())?;
    let config_path = cli.config.clone().or_else(resolve_config_path);
    Ok(CommandContext {
        cfg,
        paths,
        config_path,
    })
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let ctx = build_context(&cli)?;
    let today = Local::now().date_naive();

    let report = match &cli.command {
        Command::Migrate(args) => todo_migrate::run(
            &ctx,
            &TodoMigrateOptions {
                source_date: args.source_date.unwrap_or(today - Duration::days(1)),
                target_date: args.target_date.unwrap_or(today),
                dry_run: args.dry_run,
            },
        )?,
        Command::Archive(args) => weekly_archive::run(
            &ctx,
            &WeeklyArchiveOptions {
                week: args.week.clone(),
                today,
                dry_run: args.dry_run,
            },
        )?,
        Command::Status => status::run(&ctx)?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        bail!(
            "{} finished with {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn migrate_flags_parse_dates() {
        let cli = Cli::try_parse_from([
            "vault-upkeep",
            "migrate",
            "--from",
            "2025-08-01",
            "--to",
            "2025-08-02",
            "--dry-run",
        ])
        .expect("parse");
        let Command::Migrate(args) = cli.command else {
            panic!("expected migrate");
        };
        assert_eq!(args.source_date, Some(parse_date("2025-08-01").expect("date")));
        assert!(args.dry_run);
    }

    #[test]
    fn bad_date_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["vault-upkeep", "migrate", "--from", "08/01/2025"]).is_err());
    }
}
