pub mod store;

use crate::ingest::{CaseRecord, SummaryRecord};
use serde::{Deserialize, Serialize};

pub use store::{append, load};

/// One recorded ingestion of a test run. Constructed once, never edited;
/// the history file is an append-only JSON array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    /// ISO-8601 instant recorded at ingestion time
    pub timestamp: String,
    /// Caller-supplied version label
    pub version: String,
    /// Caller-supplied free-form notes
    pub notes: String,
    pub summary: SummaryRecord,
    /// Cases in the order they appear in the XML
    pub tests: Vec<CaseRecord>,
}
