use crate::data::{ProbeOutput, ProbeResult};
use crate::error::ProbeError;
use crate::probe::{Probe, ProbeContext, resolve_requested};
use crate::report::ScanReport;
use crate::state::ScanState;
use chrono::Utc;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};
use wpsweep_scanner::{Fetcher, ScanError, Target};

/// Progress notifications, delivered as probes start and finish.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    ProbeStarted { probe: String },
    ProbeFinished { result: ProbeResult },
}

/// Callback for reporting scan progress
pub type ScanEventCallback = Arc<dyn Fn(ScanEvent) + Send + Sync>;

pub type ProbeFuture = BoxFuture<'static, ProbeOutput>;

/// Run named probe futures concurrently and wait for all of them.
///
/// Each future runs in its own task, so a panic or error in one cannot touch
/// the others. When `deadline` elapses, unfinished probes are dropped (which
/// cancels their in-flight requests) and report `DeadlineExceeded`.
/// Results come back in input order, one per distinct name.
pub async fn run_probes(
    tasks: Vec<(String, ProbeFuture)>,
    deadline: Option<Duration>,
    event_callback: Option<ScanEventCallback>,
) -> Vec<ProbeResult> {
    let expires_at = deadline.map(|d| (Instant::now() + d, d));

    let mut names: Vec<String> = Vec::with_capacity(tasks.len());
    let mut handles = Vec::with_capacity(tasks.len());

    for (name, future) in tasks {
        if names.contains(&name) {
            warn!("Probe {} requested twice, running it once", name);
            continue;
        }

        if let Some(ref callback) = event_callback {
            callback(ScanEvent::ProbeStarted {
                probe: name.clone(),
            });
        }

        let probe = name.clone();
        let callback = event_callback.clone();
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let output = match expires_at {
                Some((at, limit)) => tokio::time::timeout_at(at, future)
                    .await
                    .unwrap_or_else(|_| {
                        warn!("Probe {} hit the scan deadline", probe);
                        ProbeOutput::failed(ProbeError::DeadlineExceeded { deadline: limit })
                    }),
                None => future.await,
            };

            let result = ProbeResult::new(probe, output, started.elapsed());
            if let Some(callback) = callback {
                callback(ScanEvent::ProbeFinished {
                    result: result.clone(),
                });
            }
            result
        });

        names.push(name);
        handles.push(handle);
    }

    let joined = join_all(handles).await;

    names
        .into_iter()
        .zip(joined)
        .map(|(name, joined)| match joined {
            Ok(result) => result,
            Err(e) => {
                let message = if e.is_panic() {
                    panic_message(e.into_panic())
                } else {
                    e.to_string()
                };
                warn!("Probe {} aborted: {}", name, message);

                let result = ProbeResult::new(
                    name,
                    ProbeOutput::failed(ProbeError::Panicked { message }),
                    Duration::ZERO,
                );
                if let Some(ref callback) = event_callback {
                    callback(ScanEvent::ProbeFinished {
                        result: result.clone(),
                    });
                }
                result
            }
        })
        .collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a selection of probes against one target with a shared fetcher and
/// shared scan state.
pub struct Scanner {
    target: Arc<Target>,
    fetcher: Fetcher,
    state: Arc<ScanState>,
    concurrency: usize,
    event_callback: Option<ScanEventCallback>,
}

impl Scanner {
    pub fn new(target: Target) -> Result<Self, ScanError> {
        let fetcher = Fetcher::new(&target)?;
        Ok(Self {
            target: Arc::new(target),
            fetcher,
            state: Arc::new(ScanState::new()),
            concurrency: wpsweep_scanner::crawler::DEFAULT_CONCURRENCY,
            event_callback: None,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_event_callback(mut self, callback: ScanEventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn state(&self) -> Arc<ScanState> {
        self.state.clone()
    }

    /// Run the probes named in `requested`. Unknown names are ignored and
    /// each result is keyed by the name as it was requested.
    pub async fn run<S: AsRef<str>>(&self, requested: &[S]) -> ScanReport {
        self.run_named(resolve_requested(requested)).await
    }

    pub async fn run_selected(&self, probes: &[Probe]) -> ScanReport {
        let named = probes
            .iter()
            .map(|&probe| (probe.name().to_string(), probe))
            .collect();
        self.run_named(named).await
    }

    async fn run_named(&self, probes: Vec<(String, Probe)>) -> ScanReport {
        info!(
            "Scanning {} with {} probe(s)",
            self.target.base_url(),
            probes.len()
        );
        let started_at = Utc::now();

        let ctx = Arc::new(
            ProbeContext::new(self.target.clone(), self.fetcher.clone(), self.state.clone())
                .with_concurrency(self.concurrency),
        );

        let tasks = probes
            .into_iter()
            .map(|(name, probe)| {
                let ctx = ctx.clone();
                let future: ProbeFuture = async move { probe.run(&ctx).await }.boxed();
                (name, future)
            })
            .collect();

        let results = run_probes(tasks, self.target.deadline(), self.event_callback.clone()).await;

        let report = ScanReport {
            target: self.target.base_url().to_string(),
            started_at,
            finished_at: Utc::now(),
            results,
            version: self.state.version().await,
            users: self.state.users().await,
            sensitive_files: self.state.sensitive_files().await,
        };
        info!(
            "Scan complete: {} finding(s), {} probe error(s)",
            report.finding_count(),
            report.failed_probes().len()
        );
        report
    }
}
