//! Opportunity and report export utilities.
//!
//! This module provides functions to export chaining opportunities and route
//! reports to CSV and JSON for downstream reporting collaborators.

use std::path::Path;

use dispatch_core::chaining::ChainedTripOpportunity;

use crate::report::RouteReport;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export chaining opportunities to CSV, one row per opportunity.
///
/// # Errors
///
/// Returns an error if there is nothing to export or if file creation or CSV
/// writing fails.
pub fn export_opportunities_to_csv(
    opportunities: &[ChainedTripOpportunity],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(opportunities)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_opportunities_impl(opportunities, file)
}

/// Export chaining opportunities to JSON (an array of objects).
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_opportunities_to_json(
    opportunities: &[ChainedTripOpportunity],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(opportunities, file)
}

/// Export route reports to JSON (an array of objects).
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_reports_to_json(
    reports: &[RouteReport],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(reports, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_report, sample_opportunity};

    #[test]
    fn csv_export_writes_a_header_and_one_row_per_opportunity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("opportunities.csv");
        let opportunities = vec![sample_opportunity(), sample_opportunity()];

        export_opportunities_to_csv(&opportunities, &path).expect("export");

        let contents = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3, "header plus two rows");
        assert!(lines[0].starts_with("opportunity_id,route_type"));
        assert!(lines[1].contains("RETURN_TRIP"));
    }

    #[test]
    fn csv_export_rejects_empty_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.csv");
        let result = export_opportunities_to_csv(&[], &path);
        assert!(result.is_err());
        assert!(!path.exists(), "no file is created for empty input");
    }

    #[test]
    fn json_round_trips_reports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reports.json");
        let reports = vec![build_report(&sample_opportunity())];

        export_reports_to_json(&reports, &path).expect("export");

        let contents = std::fs::read_to_string(&path).expect("read back");
        let parsed: Vec<crate::report::RouteReport> =
            serde_json::from_str(&contents).expect("parse");
        assert_eq!(parsed, reports);
    }
}
