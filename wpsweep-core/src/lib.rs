pub mod catalog;
pub mod data;
pub mod error;
pub mod probe;
pub mod report;
pub mod scan;
pub mod security;
pub mod state;

pub use data::{Finding, ProbeOutput, ProbeResult, Severity, WpUser};
pub use error::ProbeError;
pub use probe::{Probe, ProbeContext, resolve_probes, resolve_requested};
pub use report::{ReportFormat, ScanReport};
pub use scan::{ProbeFuture, ScanEvent, ScanEventCallback, Scanner, run_probes};
pub use state::ScanState;
