use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wpsweep_core::report::{self, ReportFormat};
use wpsweep_core::{Probe, ScanEvent, ScanEventCallback, ScanReport, Scanner};
use wpsweep_scanner::Target;
use wpsweep_scanner::crawler::DEFAULT_CONCURRENCY;
use wpsweep_scanner::target::{DEFAULT_BACKOFF, DEFAULT_RETRIES, DEFAULT_TIMEOUT};

/// Everything the `wpsweep` command line configures for one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub url: String,
    pub user_agent: Option<String>,
    pub checks: Vec<String>,
    pub retries: u32,
    pub timeout: Duration,
    pub backoff: Duration,
    pub deadline: Option<Duration>,
    pub concurrency: usize,
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
    pub quiet: bool,
}

impl ScanOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: None,
            checks: Vec::new(),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
            deadline: None,
            concurrency: DEFAULT_CONCURRENCY,
            output: None,
            format: ReportFormat::Text,
            quiet: false,
        }
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>("URL")
            .context("a target URL is required")?;

        let format_name = matches
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text");
        let Some(format) = ReportFormat::from_name(format_name) else {
            bail!("unsupported report format '{}'", format_name);
        };

        let mut options = ScanOptions::new(url.as_str());
        options.user_agent = matches.get_one::<String>("user-agent").cloned();
        options.checks = matches
            .get_one::<String>("checks")
            .map(|raw| parse_checks(raw))
            .unwrap_or_default();
        options.retries = *matches.get_one::<u32>("retries").unwrap_or(&DEFAULT_RETRIES);
        if let Some(secs) = matches.get_one::<u64>("timeout") {
            options.timeout = Duration::from_secs(*secs);
        }
        if let Some(millis) = matches.get_one::<u64>("backoff-ms") {
            options.backoff = Duration::from_millis(*millis);
        }
        options.deadline = matches
            .get_one::<u64>("deadline")
            .map(|secs| Duration::from_secs(*secs));
        options.concurrency = *matches
            .get_one::<usize>("concurrency")
            .unwrap_or(&DEFAULT_CONCURRENCY);
        options.output = matches
            .get_one::<String>("output")
            .map(|raw| resolve_output_path(raw));
        options.format = format;
        options.quiet = matches.get_flag("quiet");

        Ok(options)
    }

    /// Probe names to run; every probe when none were given.
    pub fn probe_names(&self) -> Vec<String> {
        if self.checks.is_empty() {
            Probe::ALL.iter().map(|p| p.name().to_string()).collect()
        } else {
            self.checks.clone()
        }
    }
}

/// Split a `--checks` value on commas, dropping blanks.
pub fn parse_checks(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

pub fn resolve_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Fail before scanning when the report could never be written.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        bail!("output path {} is a directory", path.display());
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            bail!("output directory {} does not exist", parent.display())
        }
        _ => Ok(()),
    }
}

pub fn build_target(options: &ScanOptions) -> Result<Target> {
    let mut target = Target::new(&options.url)
        .with_context(|| format!("invalid target URL '{}'", options.url))?
        .with_retries(options.retries)
        .with_timeout(options.timeout)
        .with_backoff(options.backoff)
        .with_deadline(options.deadline);
    if let Some(ref agent) = options.user_agent {
        target = target.with_user_agent(agent.as_str());
    }
    Ok(target)
}

fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn print_banner(options: &ScanOptions, target: &Target) {
    print_divider();
    println!("{}", "  WPSWEEP".bright_white().bold());
    print_divider();
    println!("Target:      {}", target.base_url().cyan());
    println!("Probes:      {}", options.probe_names().join(", "));
    println!(
        "Retries:     {} (backoff {}ms, timeout {}s)",
        target.retries(),
        target.backoff().as_millis(),
        target.timeout().as_secs()
    );
    if let Some(deadline) = target.deadline() {
        println!("Deadline:    {}s", deadline.as_secs());
    }
    println!("Concurrency: {}\n", options.concurrency);
}

fn progress_callback(spinner: ProgressBar) -> ScanEventCallback {
    Arc::new(move |event: ScanEvent| match event {
        ScanEvent::ProbeStarted { probe } => {
            spinner.set_message(format!("running {}", probe));
        }
        ScanEvent::ProbeFinished { result } => {
            let line = match result.error {
                None => format!(
                    "{} {:<22} {} finding(s)",
                    "✓".green().bold(),
                    result.probe,
                    result.findings.len()
                ),
                Some(ref e) => format!("{} {:<22} {}", "✗".red().bold(), result.probe, e),
            };
            spinner.println(line);
        }
    })
}

/// Run the configured scan and hand back the report.
pub async fn execute_scan(options: &ScanOptions) -> Result<ScanReport> {
    let target = build_target(options)?;
    if !options.quiet {
        print_banner(options, &target);
    }

    let mut scanner = Scanner::new(target)
        .context("failed to initialise HTTP client")?
        .with_concurrency(options.concurrency);

    let spinner = if options.quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("invalid spinner template")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };
    if !options.quiet {
        scanner = scanner.with_event_callback(progress_callback(spinner.clone()));
    }

    let names = options.probe_names();
    debug!("Requested probes: {:?}", names);
    let report = scanner.run(&names).await;
    spinner.finish_and_clear();

    Ok(report)
}

/// Print the report, or save it when an output path was given.
pub fn write_report(report: &ScanReport, options: &ScanOptions) -> Result<()> {
    match options.output {
        Some(ref path) => {
            let content = report::render(report, options.format, false)
                .context("failed to render report")?;
            report::save_report(&content, path)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
            if !options.quiet {
                println!("{} Report saved to {}", "✓".green().bold(), path.display());
            }
        }
        None => {
            let color = std::io::stdout().is_terminal();
            let content = report::render(report, options.format, color)
                .context("failed to render report")?;
            print!("{}", content);
        }
    }
    Ok(())
}

pub async fn handle_scan(matches: &ArgMatches) -> Result<()> {
    let options = ScanOptions::from_matches(matches)?;
    if let Some(ref path) = options.output {
        validate_output_path(path)?;
    }

    let report = execute_scan(&options).await?;

    if !options.quiet {
        let failed = report.failed_probes().len();
        println!(
            "\n{} Scan complete: {} finding(s), {} probe error(s)\n",
            "✓".green().bold(),
            report.finding_count(),
            failed
        );
    }

    write_report(&report, &options)
}

pub fn handle_list_checks() {
    for probe in Probe::ALL {
        println!("{:<22} {}", probe.name().bright_cyan(), probe.description());
    }
}
