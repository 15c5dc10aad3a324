use anyhow::Result;
use chrono::NaiveDate;

use crate::commands::{CommandContext, CommandReport};
use crate::vault::archive;
use crate::vault::locator::format_date;
use crate::vault::week::WeekSpec;

#[derive(Debug, Clone)]
pub struct WeeklyArchiveOptions {
    pub week: Option<String>,
    pub today: NaiveDate,
    pub dry_run: bool,
}

pub fn run(ctx: &CommandContext, opts: &WeeklyArchiveOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("archive");
    let spec = WeekSpec::parse(opts.week.as_deref())?;
    let plan = archive::plan_archive(&ctx.paths, &ctx.cfg.archive, spec, opts.today)?;

    report.detail(format!(
        "week={} ({} to {})",
        plan.description,
        format_date(plan.range.monday),
        format_date(plan.range.sunday)
    ));
    report.detail(format!("destination={}", plan.destination.display()));

    if plan.notes.is_empty() {
        report.detail("no daily notes found for this week");
        return Ok(report);
    }

    report.detail(format!("notes={}", plan.notes.len()));
    for note in &plan.notes {
        report.detail(format!("note={}", note.display()));
    }
    report.detail(format!("screenshots={}", plan.screenshots.len()));
    for shot in &plan.screenshots {
        report.detail(format!("screenshot={}", shot.display()));
    }

    if opts.dry_run {
        report.detail("dry-run: no files moved");
        return Ok(report);
    }

    let outcome = archive::apply_archive(&plan)?;
    for moved in &outcome.moved {
        report.detail(format!("moved {} -> {}", moved.from.display(), moved.to.display()));
    }
    for (file, reason) in &outcome.failed {
        report.issue(format!("failed to move {}: {reason}", file.display()));
    }
    report.detail(format!("archived {} file(s)", outcome.moved.len()));
    Ok(report)
}
