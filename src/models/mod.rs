pub mod context_info;
pub mod geocache;
pub mod image;
pub mod log_entry;
pub mod log_type;
pub mod offline_log;
pub mod trackable;

pub use context_info::LogContextInfo;
pub use geocache::{CacheType, Geocache};
pub use image::Image;
pub use log_entry::{LogEntry, LogEntryBuilder};
pub use log_type::{LogType, LogTypeTrackable, ReportProblemType};
pub use offline_log::OfflineLog;
pub use trackable::{TrackableBrand, TrackableLog};
