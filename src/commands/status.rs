use anyhow::Result;
use std::env;

use crate::commands::{CommandContext, CommandReport};
use crate::vault::config::{CONFIG_PATH_ENV, ENV_OVERRIDES};
use crate::{env_loader, logging};

/// Every `VAULT_UPKEEP_*` variable the binary reads.
fn known_variables() -> impl Iterator<Item = &'static str> {
    ENV_OVERRIDES
        .iter()
        .map(|&(var, _)| var)
        .chain([CONFIG_PATH_ENV, logging::LOG_ENV, env_loader::HOME_ENV])
}

fn active_env_overrides() -> Vec<(&'static str, String)> {
    known_variables()
        .filter_map(|key| env::var(key).ok().map(|value| (key, value)))
        .collect()
}

pub fn run(ctx: &CommandContext) -> Result<CommandReport> {
    let mut report = CommandReport::new("status");
    let paths = &ctx.paths;

    report.detail(format!("vault_root={}", paths.vault_root.display()));
    report.detail(format!("daily_notes_dir={}", paths.daily_notes_dir.display()));
    report.detail(format!("archive_dir={}", paths.archive_dir.display()));
    match &ctx.config_path {
        Some(path) if path.exists() => report.detail(format!("config={}", path.display())),
        Some(path) => report.detail(format!("config={} (not present, defaults)", path.display())),
        None => report.detail("config=defaults"),
    }
    report.detail(format!("todo.heading={}", ctx.cfg.todo.heading));
    report.detail(format!("todo.indent={}", ctx.cfg.indent_unit()?));
    report.detail(format!(
        "archive.screenshot_dirs={}",
        ctx.cfg.archive.screenshot_dirs.join(",")
    ));
    report.detail(format!(
        "archive.image_extensions={}",
        ctx.cfg.archive.image_extensions.join(",")
    ));
    for (key, value) in active_env_overrides() {
        report.detail(format!("env.{key}={value}"));
    }

    if !paths.vault_root.is_dir() {
        report.issue(format!("missing vault root ({})", paths.vault_root.display()));
    }
    if !paths.daily_notes_dir.is_dir() {
        report.issue(format!(
            "missing daily notes dir ({})",
            paths.daily_notes_dir.display()
        ));
    }

    Ok(report)
}
