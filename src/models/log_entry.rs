use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::image::Image;
use super::log_type::{LogType, ReportProblemType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub service_log_id: Option<String>,
    pub log_type: LogType,
    /// Local timestamp of the visit.
    pub date: NaiveDateTime,
    pub log: String,
    pub author: Option<String>,
    /// Written by the current user (or a friend of theirs).
    pub friend: bool,
    pub report_problem: ReportProblemType,
    pub log_images: Vec<Image>,
}

impl LogEntry {
    pub fn builder() -> LogEntryBuilder {
        LogEntryBuilder::default()
    }

    /// Builder preloaded with this entry's values.
    pub fn build_upon(&self) -> LogEntryBuilder {
        LogEntryBuilder {
            entry: self.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntryBuilder {
    entry: LogEntry,
}

impl Default for LogEntryBuilder {
    fn default() -> Self {
        Self {
            entry: LogEntry {
                service_log_id: None,
                log_type: LogType::Unknown,
                date: chrono::Local::now().naive_local(),
                log: String::new(),
                author: None,
                friend: false,
                report_problem: ReportProblemType::NoProblem,
                log_images: Vec::new(),
            },
        }
    }
}

impl LogEntryBuilder {
    pub fn service_log_id(mut self, id: impl Into<String>) -> Self {
        self.entry.service_log_id = Some(id.into());
        self
    }

    pub fn log_type(mut self, log_type: LogType) -> Self {
        self.entry.log_type = log_type;
        self
    }

    pub fn date(mut self, date: NaiveDateTime) -> Self {
        self.entry.date = date;
        self
    }

    pub fn log(mut self, text: impl Into<String>) -> Self {
        self.entry.log = text.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.entry.author = Some(author.into());
        self
    }

    pub fn friend(mut self, friend: bool) -> Self {
        self.entry.friend = friend;
        self
    }

    pub fn report_problem(mut self, problem: ReportProblemType) -> Self {
        self.entry.report_problem = problem;
        self
    }

    pub fn add_log_image(mut self, image: Image) -> Self {
        self.entry.log_images.push(image);
        self
    }

    pub fn log_images(mut self, images: Vec<Image>) -> Self {
        self.entry.log_images = images;
        self
    }

    pub fn build(self) -> LogEntry {
        self.entry
    }
}
