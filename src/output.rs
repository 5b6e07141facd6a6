use std::io::{self, Write};

use serde::Serialize;

use crate::catalog::FamilyPlan;
use crate::controller::RunSummary;
use crate::domain::Resource;
use crate::verify::VerifyReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_plan(plans: &[FamilyPlan]) -> io::Result<()> {
        Self::print_json(plans)
    }

    pub fn print_run(summary: &RunSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_verify(report: &VerifyReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_plan(plans: &[FamilyPlan]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for plan in plans {
            writeln!(stdout, "# {} ({})", plan.name, plan.resources.len())?;
            for resource in &plan.resources {
                match resource {
                    Resource::File(descriptor) => {
                        writeln!(stdout, "{} -> {}", descriptor.locator(), descriptor.destination())?
                    }
                    Resource::Archive(bundle) => writeln!(
                        stdout,
                        "{} => {} [{}]",
                        bundle.locator,
                        bundle.extraction_root,
                        bundle.allow_list.join(", ")
                    )?,
                }
            }
        }
        Ok(())
    }

    pub fn print_run(summary: &RunSummary) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "issued {} transfers: {} succeeded, {} failed",
            summary.issued,
            summary.succeeded,
            summary.failed.len()
        )?;
        for outcome in &summary.failed {
            writeln!(
                stdout,
                "  failed {}: {}",
                outcome.locator,
                outcome.error.as_deref().unwrap_or("unknown error")
            )?;
        }
        Ok(())
    }

    pub fn print_verify(report: &VerifyReport) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "{} of {} expected files present",
            report.present, report.expected
        )?;
        for entry in &report.missing {
            writeln!(stdout, "  missing [{}] {}", entry.family, entry.path)?;
        }
        Ok(())
    }
}
