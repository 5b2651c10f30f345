pub mod api;
pub mod manager;
pub mod patterns;
pub mod trackable;
pub mod vote;
pub mod wire;

pub use api::GcLogApi;
pub use manager::GcLoggingManager;
pub use trackable::TravelBugConnector;
pub use vote::GcVote;
