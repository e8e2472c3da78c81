// Tests for report generation functionality

use chrono::{TimeZone, Utc};
use std::time::Duration;
use wpsweep_core::report::{
    ReportFormat, SeverityCounts, generate_json_report, generate_text_report, render, save_report,
};
use wpsweep_core::{Finding, ProbeError, ProbeOutput, ProbeResult, ScanReport, Severity, WpUser};

fn sample_report() -> ScanReport {
    let started_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    ScanReport {
        target: "http://blog.example.test".to_string(),
        started_at,
        finished_at: started_at + chrono::Duration::milliseconds(2500),
        results: vec![
            ProbeResult::new(
                "readme",
                ProbeOutput::found(vec![Finding::new(
                    Severity::Low,
                    "readme.html exposed",
                    "The default readme file is publicly accessible.",
                    "http://blog.example.test/readme.html",
                )]),
                Duration::from_millis(40),
            ),
            ProbeResult::new(
                "backup_files",
                ProbeOutput::found(vec![Finding::new(
                    Severity::High,
                    "Backup or sensitive file exposed",
                    "http://blog.example.test/wp-config.php.bak is publicly downloadable.",
                    "http://blog.example.test/wp-config.php.bak",
                )]),
                Duration::from_millis(900),
            ),
            ProbeResult::new(
                "enum_users",
                ProbeOutput::failed(ProbeError::AccessDenied {
                    url: "http://blog.example.test/wp-json/wp/v2/users".to_string(),
                    status: 403,
                }),
                Duration::from_millis(15),
            ),
        ],
        version: Some("6.4.2".to_string()),
        users: vec![WpUser {
            id: 1,
            name: "Site Admin".to_string(),
            slug: "admin".to_string(),
        }],
        sensitive_files: vec!["http://blog.example.test/wp-config.php.bak".to_string()],
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_name() {
    assert_eq!(ReportFormat::from_name("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_name("TXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_name("Json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_name("pdf"), None);
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn test_report_aggregates() {
    let report = sample_report();

    assert_eq!(report.finding_count(), 2);
    assert_eq!(report.failed_probes().len(), 1);
    assert_eq!(report.failed_probes()[0].probe, "enum_users");
    assert_eq!(
        report.severity_counts(),
        SeverityCounts {
            critical: 0,
            high: 1,
            medium: 0,
            low: 1,
            info: 0,
        }
    );
    assert!(report.result_for("readme").is_some());
    assert!(report.result_for("themes").is_none());
    assert!((report.duration_seconds() - 2.5).abs() < f64::EPSILON);
}

#[test]
fn test_sorted_findings_most_severe_first() {
    let report = sample_report();
    let sorted = report.sorted_findings();

    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].0, "backup_files");
    assert_eq!(sorted[0].1.severity, Severity::High);
    assert_eq!(sorted[1].0, "readme");
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_sections() {
    let text = generate_text_report(&sample_report(), false);

    assert!(text.contains("WPSWEEP WORDPRESS SCAN REPORT"));
    assert!(text.contains("Target:       http://blog.example.test"));
    assert!(text.contains("Scan Date:    2024-03-01 12:00:00 UTC"));
    assert!(text.contains("WP Version:   6.4.2"));
    assert!(text.contains("Total Findings: 2"));
    assert!(text.contains("[HIGH]"));
    assert!(text.contains("DETAILED FINDINGS"));
    assert!(text.contains("access_denied"));
    assert!(text.contains("admin"));
    assert!(text.contains("End of Report"));

    let high = text.find("[1] Backup or sensitive file exposed").unwrap();
    let low = text.find("[2] readme.html exposed").unwrap();
    assert!(high < low);
}

#[test]
fn test_plain_text_report_has_no_escape_codes() {
    let text = generate_text_report(&sample_report(), false);
    assert!(!text.contains('\x1b'));
}

#[test]
fn test_text_report_for_empty_scan() {
    let mut report = sample_report();
    report.results.clear();
    report.users.clear();
    report.sensitive_files.clear();
    report.version = None;

    let text = generate_text_report(&report, false);
    assert!(text.contains("Total Findings: 0"));
    assert!(!text.contains("DETAILED FINDINGS"));
    assert!(!text.contains("COLLECTED"));
    assert!(!text.contains("WP Version"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["generator"], "wpsweep");
    assert_eq!(report["summary"]["total_findings"], 2);
    assert_eq!(report["summary"]["failed_probes"], 1);
    assert_eq!(report["summary"]["severity_breakdown"]["high"], 1);

    let scan = &report["scan"];
    assert_eq!(scan["target"], "http://blog.example.test");
    assert_eq!(scan["version"], "6.4.2");
    assert_eq!(scan["results"].as_array().unwrap().len(), 3);
    assert_eq!(scan["results"][0]["elapsed"], 40);
    assert_eq!(scan["results"][1]["findings"][0]["severity"], "high");
    assert!(scan["results"][0].get("error").is_none());
    assert_eq!(scan["results"][2]["error"]["kind"], "access_denied");
    assert_eq!(scan["results"][2]["error"]["status"], 403);
    assert_eq!(scan["users"][0]["slug"], "admin");
}

#[test]
fn test_render_dispatches_on_format() {
    let report = sample_report();
    let text = render(&report, ReportFormat::Text, false).unwrap();
    let json = render(&report, ReportFormat::Json, false).unwrap();

    assert!(text.starts_with('━'));
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
}

#[test]
fn test_save_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    save_report("hello report", &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello report");
}

#[test]
fn test_save_report_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no/such/dir/report.txt");

    assert!(save_report("x", &path).is_err());
}
