// Tests for probe orchestration

use futures::FutureExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wpsweep_core::{
    Finding, Probe, ProbeError, ProbeFuture, ProbeOutput, ScanEvent, ScanEventCallback, Scanner,
    Severity, run_probes,
};
use wpsweep_scanner::Target;

fn target_for(server: &MockServer) -> Target {
    Target::new(&server.uri())
        .unwrap()
        .with_retries(1)
        .with_backoff(Duration::from_millis(10))
        .with_timeout(Duration::from_secs(5))
}

fn finding(title: &str) -> Finding {
    Finding::new(Severity::Info, title, "test", "http://example.test/")
}

fn ok_probe(title: &'static str) -> ProbeFuture {
    async move { ProbeOutput::found(vec![finding(title)]) }.boxed()
}

fn panicking_probe(message: &'static str) -> ProbeFuture {
    async move {
        if !message.is_empty() {
            panic!("{}", message);
        }
        ProbeOutput::default()
    }
    .boxed()
}

// ============================================================================
// run_probes
// ============================================================================

#[tokio::test]
async fn test_panicking_probe_does_not_affect_siblings() {
    let tasks: Vec<(String, ProbeFuture)> = vec![
        ("a".to_string(), ok_probe("from a")),
        ("b".to_string(), panicking_probe("probe b exploded")),
        ("c".to_string(), ok_probe("from c")),
    ];

    let results = run_probes(tasks, None, None).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].probe, "a");
    assert!(results[0].is_ok());
    assert_eq!(results[0].findings[0].title, "from a");

    assert_eq!(results[1].probe, "b");
    assert!(results[1].findings.is_empty());
    match &results[1].error {
        Some(ProbeError::Panicked { message }) => assert!(message.contains("exploded")),
        other => panic!("expected Panicked, got {:?}", other),
    }

    assert_eq!(results[2].probe, "c");
    assert!(results[2].is_ok());
}

#[tokio::test]
async fn test_failed_probe_keeps_partial_findings() {
    let tasks: Vec<(String, ProbeFuture)> = vec![(
        "partial".to_string(),
        async {
            ProbeOutput {
                findings: vec![finding("kept")],
                error: Some(ProbeError::Transient {
                    url: "http://example.test/x".to_string(),
                    detail: "server error 503".to_string(),
                }),
            }
        }
        .boxed(),
    )];

    let results = run_probes(tasks, None, None).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].findings.len(), 1);
    assert_eq!(results[0].error.as_ref().map(|e| e.kind()), Some("transient"));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_marks_unfinished_probes() {
    let tasks: Vec<(String, ProbeFuture)> = vec![
        (
            "slow".to_string(),
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                ProbeOutput::found(vec![finding("never")])
            }
            .boxed(),
        ),
        ("fast".to_string(), ok_probe("quick")),
    ];

    let results = run_probes(tasks, Some(Duration::from_secs(1)), None).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].findings.is_empty());
    assert!(matches!(
        results[0].error,
        Some(ProbeError::DeadlineExceeded { deadline }) if deadline == Duration::from_secs(1)
    ));
    assert!(results[1].is_ok());
    assert_eq!(results[1].findings.len(), 1);
}

#[tokio::test]
async fn test_duplicate_names_run_once() {
    let runs = Arc::new(Mutex::new(0));
    let counting = |runs: Arc<Mutex<i32>>| -> ProbeFuture {
        async move {
            *runs.lock().unwrap() += 1;
            ProbeOutput::default()
        }
        .boxed()
    };

    let tasks = vec![
        ("same".to_string(), counting(runs.clone())),
        ("same".to_string(), counting(runs.clone())),
    ];
    let results = run_probes(tasks, None, None).await;

    assert_eq!(results.len(), 1);
    assert_eq!(*runs.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_events_are_delivered_for_every_probe() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let callback: ScanEventCallback = Arc::new(move |event: ScanEvent| {
        let label = match event {
            ScanEvent::ProbeStarted { probe } => format!("start:{}", probe),
            ScanEvent::ProbeFinished { result } => format!("finish:{}", result.probe),
        };
        sink.lock().unwrap().push(label);
    });

    let tasks: Vec<(String, ProbeFuture)> = vec![
        ("a".to_string(), ok_probe("a")),
        ("b".to_string(), panicking_probe("b")),
    ];
    run_probes(tasks, None, Some(callback)).await;

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 4);
    for expected in ["start:a", "start:b", "finish:a", "finish:b"] {
        assert!(events.iter().any(|e| e == expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn test_no_probes_yields_no_results() {
    let results = run_probes(Vec::new(), Some(Duration::from_secs(1)), None).await;
    assert!(results.is_empty());
}

// ============================================================================
// Scanner
// ============================================================================

#[tokio::test]
async fn test_scanner_runs_requested_probes_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><link rel="stylesheet" href="/wp-content/themes/x/style.css"></head>
               <body>Version 6.4.2</body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/readme.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>WordPress</h1>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let scanner = Scanner::new(target_for(&server)).unwrap();
    let report = scanner
        .run(&["enum-users", "wordpress", "bogus", "version", "readme", "debug_log"])
        .await;

    let names: Vec<&str> = report.results.iter().map(|r| r.probe.as_str()).collect();
    assert_eq!(
        names,
        vec!["enum_users", "wordpress", "version", "readme", "debug_log"]
    );

    let users = report.result_for("enum_users").unwrap();
    assert_eq!(
        users.error,
        Some(ProbeError::AccessDenied {
            url: format!("{}/wp-json/wp/v2/users", server.uri()),
            status: 403,
        })
    );

    assert_eq!(report.result_for("wordpress").unwrap().findings.len(), 1);
    assert_eq!(report.result_for("readme").unwrap().findings.len(), 1);
    assert!(report.result_for("debug_log").unwrap().findings.is_empty());
    assert!(report.result_for("debug_log").unwrap().is_ok());
    assert_eq!(report.version.as_deref(), Some("6.4.2"));
    assert_eq!(report.failed_probes().len(), 1);
    assert_eq!(report.finding_count(), 3);
}

#[tokio::test]
async fn test_scanner_with_no_known_probes_returns_empty_report() {
    let server = MockServer::start().await;
    let scanner = Scanner::new(target_for(&server)).unwrap();

    let report = scanner.run(&["nothing", "at_all"]).await;

    assert!(report.results.is_empty());
    assert_eq!(report.finding_count(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scanner_deadline_only_affects_slow_probes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("wp-content")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/readme.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("readme"))
        .mount(&server)
        .await;

    let target = target_for(&server).with_deadline(Some(Duration::from_millis(500)));
    let scanner = Scanner::new(target).unwrap();

    let started = std::time::Instant::now();
    let report = scanner.run(&["wordpress", "readme"]).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(matches!(
        report.result_for("wordpress").unwrap().error,
        Some(ProbeError::DeadlineExceeded { .. })
    ));
    let readme = report.result_for("readme").unwrap();
    assert!(readme.is_ok());
    assert_eq!(readme.findings.len(), 1);
}

#[tokio::test]
async fn test_results_keyed_by_requested_name() {
    let server = MockServer::start().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let scanner = Scanner::new(target_for(&server))
        .unwrap()
        .with_event_callback(Arc::new(move |event: ScanEvent| {
            if let ScanEvent::ProbeStarted { probe } = event {
                sink.lock().unwrap().push(probe);
            }
        }));
    let report = scanner.run(&["XML-RPC", "robots_text", "xml_rpc"]).await;

    assert_eq!(*seen.lock().unwrap(), vec!["XML-RPC", "robots_text"]);
    let keys: Vec<&str> = report.results.iter().map(|r| r.probe.as_str()).collect();
    assert_eq!(keys, vec!["XML-RPC", "robots_text"]);
    assert!(report.result_for("robots_text").is_some());
}

#[tokio::test]
async fn test_full_catalogue_runs_on_spawned_tasks() {
    let server = MockServer::start().await;
    let scanner = Scanner::new(target_for(&server)).unwrap();

    let report = scanner.run_selected(&Probe::ALL).await;

    assert_eq!(report.results.len(), Probe::ALL.len());
    for (result, probe) in report.results.iter().zip(Probe::ALL) {
        assert_eq!(result.probe, probe.name());
        assert!(
            !matches!(result.error, Some(ProbeError::Panicked { .. })),
            "{} panicked",
            result.probe
        );
    }
}
