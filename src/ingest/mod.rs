pub mod junit;
pub mod types;

pub use junit::parse_junit_file;
pub use types::{CaseRecord, CaseStatus, SummaryRecord};
