//! `deceptinet report` command handler (default command)
//!
//! Runs the full analysis and prints it in the classic analyzer layout:
//! banner, summary report, one section per honeypot, closing line.

use std::io::Write;

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use tracing::info;

use deceptinet_core::config::DeceptinetConfig;
use deceptinet_core::types::SourceKind;
use deceptinet_log_pipeline::{
    AnalysisReport, Inventory, RankedDimension, ReportGenerator, SectionOutcome, SourceSection,
    SummaryView,
};

use crate::cli::ReportArgs;
use crate::commands::status::render_fleet_summary;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const RULE_WIDTH: usize = 50;

/// Execute the `report` command.
///
/// Per-source failures show up as report sections; they never fail the command.
pub async fn execute(
    args: ReportArgs,
    mut config: DeceptinetConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    apply_args(&mut config, &args)?;

    let report = ReportGenerator::new(config).run().await;
    if report.failed_sections() > 0 {
        info!(
            failed = report.failed_sections(),
            "some sources could not be read; see report sections"
        );
    }

    writer.render(&report)?;
    Ok(())
}

/// Apply `--top` and `--source` on top of the loaded configuration.
fn apply_args(config: &mut DeceptinetConfig, args: &ReportArgs) -> Result<(), CliError> {
    if let Some(top) = args.top {
        if top == 0 {
            return Err(CliError::Command("--top must be greater than 0".to_owned()));
        }
        config.report.top_n = top;
    }

    if args.sources.is_empty() {
        return Ok(());
    }

    for wanted in &args.sources {
        if !config
            .sources
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(wanted))
        {
            let known: Vec<&str> = config.sources.iter().map(|s| s.name.as_str()).collect();
            return Err(CliError::Command(format!(
                "unknown source '{}' (configured: {})",
                wanted,
                known.join(", ")
            )));
        }
    }

    for source in &mut config.sources {
        source.enabled = args
            .sources
            .iter()
            .any(|wanted| source.name.eq_ignore_ascii_case(wanted));
    }
    Ok(())
}

impl Render for AnalysisReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        heading(w, "DECEPTINET LOG ANALYZER")?;
        writeln!(w, "Analyzing honeypot activity...")?;

        writeln!(w)?;
        heading(w, "DECEPTINET SUMMARY REPORT")?;
        writeln!(
            w,
            "Generated: {}",
            self.generated_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        )?;
        render_fleet_summary(&self.fleet, w)?;

        for section in &self.sections {
            writeln!(w)?;
            section.render_text(w)?;
        }

        writeln!(w)?;
        writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(w, "{}", "Analysis complete!".green().bold())?;
        writeln!(
            w,
            "Tip: Run this analyzer periodically to track attacker trends"
        )?;
        Ok(())
    }
}

impl Render for SourceSection {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        heading(w, &format!("{} ANALYSIS", self.name.to_uppercase()))?;

        match &self.outcome {
            SectionOutcome::Summary(view) => render_summary(view, self.kind, w),
            SectionOutcome::Inventory { inventory, limit } => {
                render_inventory(inventory, *limit, w)
            }
            SectionOutcome::Missing => {
                writeln!(w, "{}", format!("No {} logs found", self.name).yellow())?;
                writeln!(w, "   {}", self.path.display().to_string().dimmed())
            }
            SectionOutcome::Failed { error } => {
                writeln!(w, "{} {}", "Error:".red().bold(), error)
            }
        }
    }
}

fn heading(w: &mut dyn Write, title: &str) -> std::io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(w, "{rule}")?;
    writeln!(w, "{}", title.bold())?;
    writeln!(w, "{rule}")
}

fn render_summary(view: &SummaryView, kind: SourceKind, w: &mut dyn Write) -> std::io::Result<()> {
    if let Some(headline) = &view.headline {
        writeln!(w, "{}: {}", headline.label, headline.count)?;
    }
    writeln!(w, "Total events: {}", view.total_events)?;
    if view.malformed_lines > 0 {
        writeln!(
            w,
            "{}",
            format!("Malformed lines skipped: {}", view.malformed_lines).yellow()
        )?;
    }
    if let Some(sessions) = view.sessions {
        writeln!(w, "Total sessions: {sessions}")?;
    }
    if let (Some(first), Some(last)) = (view.first_seen, view.last_seen) {
        writeln!(
            w,
            "Activity window: {} to {}",
            utc_stamp(&first),
            utc_stamp(&last)
        )?;
    }

    for dimension in &view.dimensions {
        writeln!(w)?;
        render_dimension(dimension, kind, w)?;
    }
    Ok(())
}

fn render_dimension(
    dimension: &RankedDimension,
    kind: SourceKind,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(
        w,
        "{} ({} unique):",
        dimension.title.cyan().bold(),
        dimension.unique
    )?;

    if dimension.entries.is_empty() {
        return writeln!(w, "   {}", "(none)".dimmed());
    }

    for entry in &dimension.entries {
        if dimension.quoted {
            writeln!(w, "   '{}': {} times", entry.display, entry.count)?;
        } else {
            writeln!(w, "   {}: {} {}", entry.display, entry.count, unit(kind))?;
        }
    }
    Ok(())
}

/// Counting unit for unquoted entries, per adapter kind.
fn unit(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::WebLogin => "attempts",
        SourceKind::SshSession | SourceKind::MalwareListing => "events",
    }
}

fn render_inventory(inventory: &Inventory, limit: usize, w: &mut dyn Write) -> std::io::Result<()> {
    if inventory.is_empty() {
        return writeln!(
            w,
            "{}",
            format!("No log files found in {}", inventory.directory.display()).yellow()
        );
    }

    writeln!(w, "Found {} log files", inventory.total_files)?;
    for entry in inventory.head(limit) {
        writeln!(w, "   - {} ({} bytes)", entry.name, entry.size_bytes)?;
    }
    let hidden = inventory.total_files.saturating_sub(limit);
    if hidden > 0 {
        writeln!(w, "   ... and {hidden} more")?;
    }
    Ok(())
}

fn utc_stamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
