use anyhow::Result;
use chrono::NaiveDate;

use crate::commands::{CommandContext, CommandReport};
use crate::todo::migrate::{self, MigrationOutcome, MigrationPlan, MigrationSettings};
use crate::vault::locator::{NoteLocator, format_date};

#[derive(Debug, Clone)]
pub struct TodoMigrateOptions {
    pub source_date: NaiveDate,
    pub target_date: NaiveDate,
    pub dry_run: bool,
}

fn preview(report: &mut CommandReport, plan: &MigrationPlan) {
    for line in &plan.moved_lines {
        report.detail(format!("source - {line}"));
    }
    for line in &plan.inserted_lines {
        report.detail(format!("target + {line}"));
    }
    report.detail("source section after:");
    for line in plan.source_section_after.lines() {
        report.detail(format!("  | {line}"));
    }
    report.detail("target section after:");
    for line in plan.target_section_after.lines() {
        report.detail(format!("  | {line}"));
    }
}

pub fn run(ctx: &CommandContext, opts: &TodoMigrateOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("migrate");
    let locator = NoteLocator::new(&ctx.paths.daily_notes_dir);
    let settings = MigrationSettings {
        heading: ctx.cfg.heading()?,
        default_indent: ctx.cfg.indent_unit()?,
        new_note_template: ctx.cfg.todo.new_note_template.clone(),
    };

    report.detail(format!("source_date={}", format_date(opts.source_date)));
    report.detail(format!("target_date={}", format_date(opts.target_date)));
    report.detail(format!("daily_notes_dir={}", locator.dir().display()));

    let plan = match migrate::plan_migration(&locator, &settings, opts.source_date, opts.target_date)? {
        MigrationOutcome::NoSection {
            source_path,
            heading,
        } => {
            report.detail(format!("source_note={}", source_path.display()));
            report.detail(format!("nothing to migrate: no `{heading}` section in source"));
            return Ok(report);
        }
        MigrationOutcome::NothingToMigrate {
            source_path,
            kept_groups,
        } => {
            report.detail(format!("source_note={}", source_path.display()));
            report.detail(format!(
                "nothing to migrate: {kept_groups} group(s) already complete"
            ));
            return Ok(report);
        }
        MigrationOutcome::Planned(plan) => plan,
    };

    report.detail(format!("source_note={}", plan.writes.source_path.display()));
    report.detail(format!("target_note={}", plan.writes.target_path.display()));
    report.detail(format!("groups={}", plan.groups));
    report.detail(format!("items={}", plan.items));
    report.detail(format!("tagged={}", plan.tagged));
    report.detail(format!("kept_groups={}", plan.kept_groups));
    if plan.target_created {
        report.detail("target_note.created=true");
    }
    if plan.section_created {
        report.detail("target_section.created=true");
    }
    if !plan.malformed.is_empty() {
        report.detail(format!(
            "malformed_lines={} (migrated as unchecked items)",
            plan.malformed.len()
        ));
    }

    if opts.dry_run {
        report.detail("dry-run: no files modified");
        preview(&mut report, &plan);
        return Ok(report);
    }

    migrate::apply(&plan)?;
    report.detail(format!(
        "migrated {} todo(s) in {} group(s) to {}",
        plan.items,
        plan.groups,
        plan.target_date
    ));
    Ok(report)
}
