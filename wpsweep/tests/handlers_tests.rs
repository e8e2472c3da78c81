use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wpsweep::handlers::*;
use wpsweep_core::ReportFormat;

fn quiet_options(url: &str) -> ScanOptions {
    let mut options = ScanOptions::new(url);
    options.retries = 1;
    options.backoff = Duration::from_millis(10);
    options.timeout = Duration::from_secs(5);
    options.quiet = true;
    options
}

#[test]
fn test_parse_checks() {
    assert_eq!(
        parse_checks("readme, debug_log,,xml-rpc "),
        vec!["readme", "debug_log", "xml-rpc"]
    );
    assert!(parse_checks(" , ").is_empty());
}

#[test]
fn test_probe_names_default_to_all() {
    let options = ScanOptions::new("example.test");
    let names = options.probe_names();
    assert_eq!(names.len(), wpsweep_core::Probe::ALL.len());
    assert!(names.contains(&"sitemap_forms".to_string()));
}

#[test]
fn test_resolve_output_path_expands_tilde() {
    let path = resolve_output_path("~/report.json");
    assert!(path.ends_with("report.json"));
    if let Some(home) = std::env::var_os("HOME") {
        assert!(path.starts_with(home));
    }

    assert_eq!(
        resolve_output_path("out/report.txt"),
        std::path::PathBuf::from("out/report.txt")
    );
}

#[test]
fn test_validate_output_path() {
    let dir = TempDir::new().unwrap();

    assert!(validate_output_path(&dir.path().join("report.txt")).is_ok());
    assert!(validate_output_path(dir.path()).is_err());
    assert!(validate_output_path(&dir.path().join("missing/report.txt")).is_err());
    assert!(validate_output_path(std::path::Path::new("report.txt")).is_ok());
}

#[test]
fn test_build_target() {
    let mut options = ScanOptions::new("blog.example.test/");
    options.user_agent = Some("audit/1.0".to_string());
    options.deadline = Some(Duration::from_secs(30));
    options.retries = 3;

    let target = build_target(&options).unwrap();
    assert_eq!(target.base_url(), "http://blog.example.test");
    assert_eq!(target.user_agent(), "audit/1.0");
    assert_eq!(target.retries(), 3);
    assert_eq!(target.deadline(), Some(Duration::from_secs(30)));
}

#[test]
fn test_build_target_rejects_bad_scheme() {
    let options = ScanOptions::new("ftp://blog.example.test");
    let err = build_target(&options).unwrap_err();
    assert!(err.to_string().contains("invalid target URL"));
}

#[tokio::test]
async fn test_scan_and_save_json_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/readme.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>WordPress</h1>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.json");

    let mut options = quiet_options(&server.uri());
    options.checks = parse_checks("readme,xml_rpc,unknown_probe");
    options.format = ReportFormat::Json;
    options.output = Some(output.clone());

    let report = execute_scan(&options).await.unwrap();
    assert_eq!(report.results.len(), 2);
    write_report(&report, &options).unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let results = saved["report"]["scan"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["probe"], "readme");
    assert_eq!(results[0]["findings"].as_array().unwrap().len(), 1);
    assert_eq!(results[1]["probe"], "xml_rpc");
    assert!(results[1]["findings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_saved_text_report_is_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/debug.log"))
        .respond_with(ResponseTemplate::new(200).set_body_string("PHP Fatal error"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.txt");

    let mut options = quiet_options(&server.uri());
    options.checks = vec!["debug_log".to_string()];
    options.output = Some(output.clone());

    let report = execute_scan(&options).await.unwrap();
    write_report(&report, &options).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("Debug log exposed"));
    assert!(text.contains("[HIGH]"));
    assert!(!text.contains('\x1b'));
}

#[tokio::test]
async fn test_write_report_to_missing_directory_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut options = quiet_options(&server.uri());
    options.checks = vec!["readme".to_string()];
    options.output = Some(dir.path().join("nope/report.txt"));

    let report = execute_scan(&options).await.unwrap();
    let err = write_report(&report, &options).unwrap_err();
    assert!(err.to_string().contains("failed to write report"));
}

#[tokio::test]
async fn test_execute_scan_rejects_invalid_url() {
    let options = quiet_options("gopher://blog.example.test");
    assert!(execute_scan(&options).await.is_err());
}
