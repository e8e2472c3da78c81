// Report rendering for a finished scan

use crate::data::{Finding, ProbeResult, Severity, WpUser};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const THIN_RULE: &str = "────────────────────────────────────────────────────────────────────────────────";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

/// Everything a scan produced: one result per requested probe plus the
/// scan-wide state the probes accumulated.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<ProbeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub users: Vec<WpUser>,
    pub sensitive_files: Vec<String>,
}

impl ScanReport {
    pub fn result_for(&self, probe: &str) -> Option<&ProbeResult> {
        self.results.iter().find(|r| r.probe == probe)
    }

    pub fn finding_count(&self) -> usize {
        self.results.iter().map(|r| r.findings.len()).sum()
    }

    pub fn failed_probes(&self) -> Vec<&ProbeResult> {
        self.results.iter().filter(|r| !r.is_ok()).collect()
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for finding in self.findings() {
            match finding.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }

    /// All findings, most severe first, probe order kept within a severity.
    pub fn sorted_findings(&self) -> Vec<(&str, &Finding)> {
        let mut findings: Vec<(&str, &Finding)> = self
            .results
            .iter()
            .flat_map(|r| r.findings.iter().map(move |f| (r.probe.as_str(), f)))
            .collect();
        findings.sort_by_key(|(_, f)| f.severity);
        findings
    }

    fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.results.iter().flat_map(|r| r.findings.iter())
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

pub fn render(
    report: &ScanReport,
    format: ReportFormat,
    color: bool,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report, color)),
        ReportFormat::Json => generate_json_report(report),
    }
}

pub fn generate_text_report(report: &ScanReport, color: bool) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                        WPSWEEP WORDPRESS SCAN REPORT\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&format!("Target:       {}\n", report.target));
    out.push_str(&format!(
        "Scan Date:    {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Duration:     {:.1} seconds\n", report.duration_seconds()));
    out.push_str(&format!("Probes Run:   {}\n", report.results.len()));
    if let Some(ref version) = report.version {
        out.push_str(&format!("WP Version:   {}\n", version));
    }
    out.push('\n');

    section(&mut out, "SUMMARY");
    let counts = report.severity_counts();
    out.push_str(&format!("Total Findings: {}\n\n", counts.total()));
    for (severity, count) in [
        (Severity::Critical, counts.critical),
        (Severity::High, counts.high),
        (Severity::Medium, counts.medium),
        (Severity::Low, counts.low),
        (Severity::Info, counts.info),
    ] {
        if count > 0 {
            out.push_str(&format!("  {:<10} {}\n", severity_tag(severity, color), count));
        }
    }
    out.push('\n');

    section(&mut out, "PROBES");
    for result in &report.results {
        let status = match result.error {
            None => mark("ok", color, false),
            Some(ref e) => mark(e.kind(), color, true),
        };
        out.push_str(&format!(
            "  {:<22} {:>3} finding(s)  {}\n",
            result.probe,
            result.findings.len(),
            status
        ));
        if let Some(ref e) = result.error {
            out.push_str(&format!("  {:<22} {}\n", "", e));
        }
    }
    out.push('\n');

    if !report.users.is_empty() || !report.sensitive_files.is_empty() {
        section(&mut out, "COLLECTED");
        if !report.users.is_empty() {
            out.push_str("Users:\n");
            for user in &report.users {
                out.push_str(&format!("  {:>5}  {} ({})\n", user.id, user.name, user.slug));
            }
        }
        if !report.sensitive_files.is_empty() {
            out.push_str("Sensitive files:\n");
            for file in &report.sensitive_files {
                out.push_str(&format!("  {}\n", file));
            }
        }
        out.push('\n');
    }

    let findings = report.sorted_findings();
    if !findings.is_empty() {
        section(&mut out, "DETAILED FINDINGS");
        for (idx, (probe, finding)) in findings.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n", idx + 1, finding.title));
            out.push_str(&format!("Severity:     {}\n", severity_tag(finding.severity, color)));
            out.push_str(&format!("Probe:        {}\n", probe));
            out.push_str(&format!("URL:          {}\n", finding.evidence_url));
            out.push_str("\nDescription:\n");
            out.push_str(&wrap_text(&finding.description, 80, "  "));
            out.push('\n');
            out.push_str(THIN_RULE);
            out.push_str("\n\n");
        }
    }

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                          End of Report\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str("\nGenerated by wpsweep. For authorized security testing only.\n");

    out
}

pub fn generate_json_report(report: &ScanReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "wpsweep",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": Utc::now().to_rfc3339(),
                "format": "json",
            },
            "summary": {
                "total_findings": report.finding_count(),
                "failed_probes": report.failed_probes().len(),
                "severity_breakdown": report.severity_counts(),
                "duration_seconds": report.duration_seconds(),
            },
            "scan": report,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn section(out: &mut String, title: &str) {
    out.push_str(RULE);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(RULE);
    out.push_str("\n\n");
}

fn severity_tag(severity: Severity, color: bool) -> String {
    let tag = format!("[{}]", severity.as_str().to_uppercase());
    if !color {
        return tag;
    }
    match severity {
        Severity::Critical => tag.red().bold().to_string(),
        Severity::High => tag.red().to_string(),
        Severity::Medium => tag.yellow().to_string(),
        Severity::Low => tag.cyan().to_string(),
        Severity::Info => tag.dimmed().to_string(),
    }
}

fn mark(label: &str, color: bool, failed: bool) -> String {
    match (color, failed) {
        (false, _) => label.to_string(),
        (true, false) => label.green().to_string(),
        (true, true) => label.red().bold().to_string(),
    }
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
