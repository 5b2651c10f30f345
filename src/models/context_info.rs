use super::log_type::{LogType, ReportProblemType};
use super::trackable::TrackableLog;

/// What a connector offers for writing a log on a specific cache.
///
/// Usually retrieved online before the user starts a new log or continues an
/// offline draft.
#[derive(Debug, Clone, PartialEq)]
pub struct LogContextInfo {
    pub connector_id: String,
    pub geocode: String,
    pub service_log_id: Option<String>,
    has_load_error: bool,
    user_displayable_error_message: Option<String>,
    pub available_log_types: Vec<LogType>,
    pub available_trackables: Vec<TrackableLog>,
    pub available_report_problem_types: Vec<ReportProblemType>,
    /// -1 means "not supported"
    pub available_favorite_points: i32,
}

impl LogContextInfo {
    pub fn new(
        connector_id: impl Into<String>,
        geocode: impl Into<String>,
        service_log_id: Option<String>,
    ) -> Self {
        Self {
            connector_id: connector_id.into(),
            geocode: geocode.into(),
            service_log_id,
            has_load_error: false,
            user_displayable_error_message: None,
            available_log_types: Vec::new(),
            available_trackables: Vec::new(),
            available_report_problem_types: Vec::new(),
            available_favorite_points: -1,
        }
    }

    pub fn set_error(&mut self) {
        self.add_error("");
    }

    /// Flags a load error; non-blank messages are appended to the displayable message.
    pub fn add_error(&mut self, message: &str) {
        self.has_load_error = true;
        if message.trim().is_empty() {
            return;
        }
        match &mut self.user_displayable_error_message {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(message);
            }
            None => self.user_displayable_error_message = Some(message.to_string()),
        }
    }

    pub fn has_load_error(&self) -> bool {
        self.has_load_error
    }

    pub fn user_displayable_error_message(&self) -> Option<&str> {
        self.user_displayable_error_message.as_deref()
    }
}
