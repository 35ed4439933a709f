//! Report rendering

pub mod formatter;

pub use formatter::{ReportGenerator, save_report_to_file, suggest_filename};
