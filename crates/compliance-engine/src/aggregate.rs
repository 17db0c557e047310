//! Document-level aggregation
//!
//! Rolls an ordered list of page results into a `DocumentReport`. Pure and
//! deterministic: the same pages always give the same report, so it is safe
//! to re-run on a shorter or corrected page list.
//!
//! Policy:
//! - A standard is overall compliant if at least one page is compliant for
//!   it, however many other pages are not.
//! - A page with both a compliant and a non-compliant verdict for the same
//!   standard is listed under both; a page with none is listed as
//!   unanalyzed for it.
//! - A page counts as compliant only if it has verdicts and all of them are
//!   compliant; failed pages always count as non-compliant.
//! - The document is compliant if every observed standard is. With no
//!   observed standards this is vacuously true; check
//!   `DocumentReport::has_observations`.

use std::collections::BTreeMap;

use shared_types::{DocumentReport, PageResult, StandardRollup};

/// Aggregate page results, given in page order.
///
/// Page numbers in the report are 1-based positions in `pages`.
pub fn aggregate(pages: &[PageResult]) -> DocumentReport {
    let mut checks: BTreeMap<String, StandardRollup> = BTreeMap::new();
    for page in pages {
        for verdict in &page.verdicts {
            checks.entry(verdict.standard_name.clone()).or_default();
        }
    }

    let mut report = DocumentReport {
        total_pages: pages.len(),
        ..Default::default()
    };

    for (index, page) in pages.iter().enumerate() {
        let page_number = (index + 1) as u32;

        for (standard, rollup) in checks.iter_mut() {
            // Conflicting verdicts put the page in both lists, once each
            let (mut compliant, mut non_compliant) = (false, false);
            for verdict in page.verdicts_for(standard) {
                if verdict.is_compliant {
                    compliant = true;
                } else {
                    non_compliant = true;
                }
            }
            if compliant {
                rollup.compliant_pages.push(page_number);
            }
            if non_compliant {
                rollup.non_compliant_pages.push(page_number);
            }
            if !compliant && !non_compliant {
                rollup.unanalyzed_pages.push(page_number);
            }
        }

        if page.is_compliant() {
            report.compliant_pages += 1;
        } else {
            report.non_compliant_pages += 1;
        }
        if page.is_failed() {
            report.failed_pages.push(page_number);
        }
        report.anomaly_count += page.anomalies.len();
    }

    for rollup in checks.values_mut() {
        rollup.is_overall_compliant = !rollup.compliant_pages.is_empty();
    }
    report.overall_compliance = checks.values().all(|r| r.is_overall_compliant);
    report.checks = checks;

    report
}
