pub mod handlers;

pub use handlers::{
    ScanOptions, build_target, execute_scan, parse_checks, resolve_output_path,
    validate_output_path, write_report,
};
