use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::log_type::{LogType, ReportProblemType};

/// Draft of a log that has not been sent yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineLog {
    pub geocode: String,
    pub log_type: LogType,
    pub date: NaiveDateTime,
    pub log: String,
    pub report_problem: ReportProblemType,
    pub favorite: bool,
    pub rating: f32,
}
