//! `deceptinet status` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use deceptinet_core::config::DeceptinetConfig;
use deceptinet_log_pipeline::{FleetStatus, ReportGenerator};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `status` command.
///
/// Only probes the log directory; no log file is parsed.
pub async fn execute(config: DeceptinetConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let fleet = ReportGenerator::new(config).status().await;
    writer.render(&StatusReport::from(fleet))?;
    Ok(())
}

#[derive(Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub fleet: FleetStatus,
    pub active_sources: Vec<String>,
}

impl From<FleetStatus> for StatusReport {
    fn from(fleet: FleetStatus) -> Self {
        let active_sources = fleet.active_sources().map(str::to_owned).collect();
        Self {
            fleet,
            active_sources,
        }
    }
}

impl Render for StatusReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Log directory: {}", self.fleet.log_dir.display())?;
        render_fleet_summary(&self.fleet, w)?;

        writeln!(w)?;
        writeln!(w, "{:<20} {:<10} Path", "Honeypot", "Active")?;
        writeln!(w, "{}", "-".repeat(60))?;

        for source in &self.fleet.sources {
            let active = if source.active {
                "yes".green()
            } else {
                "no".yellow()
            };
            writeln!(
                w,
                "{:<20} {:<10} {}",
                source.name,
                active,
                source.path.display().to_string().dimmed()
            )?;
        }

        Ok(())
    }
}

/// Total log file count and active honeypot list, shared with the report header.
pub fn render_fleet_summary(fleet: &FleetStatus, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Total log files: {}", fleet.total_log_files)?;

    let active: Vec<&str> = fleet.active_sources().collect();
    if active.is_empty() {
        writeln!(w, "Active honeypots: {}", "None detected".yellow())?;
    } else {
        writeln!(w, "Active honeypots: {}", active.join(", ").green())?;
    }
    Ok(())
}
