//! Console reporter for document outcomes

use anyhow::Result;
use std::fmt::Write;

use compliance_engine::DocumentOutcome;
use shared_types::{PageResult, StandardRollup};

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn format(outcome: &DocumentOutcome) -> Result<String> {
        let mut output = String::new();
        let report = &outcome.report;

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                      COMPLIANCE REPORT                       ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Started:        {}", outcome.started_at)?;
        writeln!(output, "Standards:      {}", outcome.standard_ids.join(", "))?;
        writeln!(output, "Total pages:    {}", report.total_pages)?;
        writeln!(output, "Compliant:      {}", report.compliant_pages)?;
        writeln!(output, "Non-compliant:  {}", report.non_compliant_pages)?;
        if !report.failed_pages.is_empty() {
            writeln!(output, "Failed pages:   {}", join_pages(&report.failed_pages))?;
        }
        if report.anomaly_count > 0 {
            writeln!(output, "Dropped verdicts: {}", report.anomaly_count)?;
        }
        writeln!(output)?;

        for page in &outcome.pages {
            Self::format_page(&mut output, page)?;
        }

        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output, "Standard-by-standard")?;
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        for (standard, rollup) in &report.checks {
            Self::format_rollup(&mut output, standard, rollup)?;
        }
        let unobserved = outcome.unobserved();
        if !unobserved.is_empty() {
            writeln!(output)?;
            writeln!(output, "Not observed on any page: {}", unobserved.join(", "))?;
        }

        writeln!(output)?;
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        let status = if !report.has_observations() {
            "? NO VERDICTS (nothing was evaluated)"
        } else if report.overall_compliance {
            "✓ COMPLIANT with all observed standards"
        } else {
            "✗ NON-COMPLIANT"
        };
        writeln!(output, "Overall Status: {}", status)?;
        writeln!(output)?;

        Ok(output)
    }

    fn format_page(output: &mut String, page: &PageResult) -> Result<()> {
        let status = if page.is_compliant() { "✓" } else { "✗" };
        writeln!(output, "Page {} {}", page.page_number, status)?;

        if let Some(error) = &page.error {
            writeln!(output, "  Error: {}", error)?;
        }
        for verdict in &page.verdicts {
            let mark = if verdict.is_compliant { "✓" } else { "✗" };
            writeln!(output, "  {} {}", mark, verdict.standard_name)?;
            for line in verdict.content_description.lines() {
                writeln!(output, "      {}", line)?;
            }
        }
        for standard in &page.unanalyzed {
            writeln!(output, "  - {} (not evaluated)", standard)?;
        }
        for anomaly in &page.anomalies {
            writeln!(
                output,
                "  ! dropped {} ({:?})",
                anomaly.standard_name, anomaly.kind
            )?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn format_rollup(output: &mut String, standard: &str, rollup: &StandardRollup) -> Result<()> {
        let status = if rollup.is_overall_compliant {
            "✓ Compliant"
        } else {
            "✗ Non-Compliant"
        };
        writeln!(output, "{} - {}", standard, status)?;
        if !rollup.compliant_pages.is_empty() {
            writeln!(output, "  Compliant pages:      {}", join_pages(&rollup.compliant_pages))?;
        }
        if !rollup.non_compliant_pages.is_empty() {
            writeln!(
                output,
                "  Non-compliant pages:  {}",
                join_pages(&rollup.non_compliant_pages)
            )?;
        }
        if !rollup.unanalyzed_pages.is_empty() {
            writeln!(
                output,
                "  Not evaluated:        {}",
                join_pages(&rollup.unanalyzed_pages)
            )?;
        }
        Ok(())
    }
}

fn join_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
