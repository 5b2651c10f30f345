use serde::{Deserialize, Serialize};

/// Cache log types, carrying the numeric id geocaching.com uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    FoundIt,
    DidntFindIt,
    Note,
    Archive,
    NeedsArchive,
    WillAttend,
    Attended,
    WebcamPhotoTaken,
    Unarchive,
    TempDisableListing,
    EnableListing,
    NeedsMaintenance,
    OwnerMaintenance,
    UpdateCoordinates,
    ReviewerNote,
    Unknown,
}

impl LogType {
    pub const ALL: [LogType; 15] = [
        LogType::FoundIt,
        LogType::DidntFindIt,
        LogType::Note,
        LogType::Archive,
        LogType::NeedsArchive,
        LogType::WillAttend,
        LogType::Attended,
        LogType::WebcamPhotoTaken,
        LogType::Unarchive,
        LogType::TempDisableListing,
        LogType::EnableListing,
        LogType::NeedsMaintenance,
        LogType::OwnerMaintenance,
        LogType::UpdateCoordinates,
        LogType::ReviewerNote,
    ];

    pub fn id(&self) -> i32 {
        match self {
            LogType::FoundIt => 2,
            LogType::DidntFindIt => 3,
            LogType::Note => 4,
            LogType::Archive => 5,
            LogType::NeedsArchive => 7,
            LogType::WillAttend => 9,
            LogType::Attended => 10,
            LogType::WebcamPhotoTaken => 11,
            LogType::Unarchive => 12,
            LogType::TempDisableListing => 22,
            LogType::EnableListing => 23,
            LogType::NeedsMaintenance => 45,
            LogType::OwnerMaintenance => 46,
            LogType::UpdateCoordinates => 47,
            LogType::ReviewerNote => 68,
            LogType::Unknown => 0,
        }
    }

    pub fn from_id(id: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .unwrap_or(LogType::Unknown)
    }

    pub fn is_found_log(&self) -> bool {
        matches!(
            self,
            LogType::FoundIt | LogType::Attended | LogType::WebcamPhotoTaken
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogType::FoundIt => "Found it",
            LogType::DidntFindIt => "Didn't find it",
            LogType::Note => "Write note",
            LogType::Archive => "Archive",
            LogType::NeedsArchive => "Needs archived",
            LogType::WillAttend => "Will attend",
            LogType::Attended => "Attended",
            LogType::WebcamPhotoTaken => "Webcam photo taken",
            LogType::Unarchive => "Unarchive",
            LogType::TempDisableListing => "Temporarily disable listing",
            LogType::EnableListing => "Enable listing",
            LogType::NeedsMaintenance => "Needs maintenance",
            LogType::OwnerMaintenance => "Owner maintenance",
            LogType::UpdateCoordinates => "Update coordinates",
            LogType::ReviewerNote => "Post reviewer note",
            LogType::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "found" | "found_it" => Ok(LogType::FoundIt),
            "dnf" | "didnt_find_it" => Ok(LogType::DidntFindIt),
            "note" => Ok(LogType::Note),
            "archive" => Ok(LogType::Archive),
            "needs_archive" => Ok(LogType::NeedsArchive),
            "will_attend" => Ok(LogType::WillAttend),
            "attended" => Ok(LogType::Attended),
            "webcam" | "webcam_photo_taken" => Ok(LogType::WebcamPhotoTaken),
            "unarchive" => Ok(LogType::Unarchive),
            "disable" | "temp_disable_listing" => Ok(LogType::TempDisableListing),
            "enable" | "enable_listing" => Ok(LogType::EnableListing),
            "needs_maintenance" => Ok(LogType::NeedsMaintenance),
            "owner_maintenance" => Ok(LogType::OwnerMaintenance),
            "update_coordinates" => Ok(LogType::UpdateCoordinates),
            "reviewer_note" => Ok(LogType::ReviewerNote),
            other => Err(format!("Unknown log type '{other}'")),
        }
    }
}

/// What to do with a trackable while logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogTypeTrackable {
    DoNothing,
    RetrievedIt,
    DroppedOff,
    GrabbedIt,
    Note,
    DiscoveredIt,
    Visited,
}

impl LogTypeTrackable {
    const ALL: [LogTypeTrackable; 7] = [
        LogTypeTrackable::DoNothing,
        LogTypeTrackable::RetrievedIt,
        LogTypeTrackable::DroppedOff,
        LogTypeTrackable::GrabbedIt,
        LogTypeTrackable::Note,
        LogTypeTrackable::DiscoveredIt,
        LogTypeTrackable::Visited,
    ];

    /// Numeric id used by the geocaching.com log API. `DoNothing` has none.
    pub fn gc_api_id(&self) -> Option<i32> {
        match self {
            LogTypeTrackable::DoNothing => None,
            LogTypeTrackable::RetrievedIt => Some(13),
            LogTypeTrackable::DroppedOff => Some(14),
            LogTypeTrackable::GrabbedIt => Some(19),
            LogTypeTrackable::Note => Some(4),
            LogTypeTrackable::DiscoveredIt => Some(48),
            LogTypeTrackable::Visited => Some(75),
        }
    }

    /// Stable id for the local store.
    pub fn id(&self) -> i32 {
        self.gc_api_id().unwrap_or(0)
    }

    pub fn from_id(id: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .unwrap_or(LogTypeTrackable::DoNothing)
    }
}

impl std::str::FromStr for LogTypeTrackable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "nothing" | "do_nothing" => Ok(LogTypeTrackable::DoNothing),
            "retrieve" | "retrieved_it" => Ok(LogTypeTrackable::RetrievedIt),
            "drop" | "dropped_off" => Ok(LogTypeTrackable::DroppedOff),
            "grab" | "grabbed_it" => Ok(LogTypeTrackable::GrabbedIt),
            "note" => Ok(LogTypeTrackable::Note),
            "discover" | "discovered_it" => Ok(LogTypeTrackable::DiscoveredIt),
            "visit" | "visited" => Ok(LogTypeTrackable::Visited),
            other => Err(format!("Unknown trackable action '{other}'")),
        }
    }
}

/// Problems that can be reported alongside a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportProblemType {
    NoProblem,
    LogFull,
    Damaged,
    Missing,
    Archive,
    Other,
}

impl ReportProblemType {
    pub const PROBLEMS: [ReportProblemType; 5] = [
        ReportProblemType::LogFull,
        ReportProblemType::Damaged,
        ReportProblemType::Missing,
        ReportProblemType::Archive,
        ReportProblemType::Other,
    ];

    pub fn log_type(&self) -> LogType {
        match self {
            ReportProblemType::NoProblem => LogType::Unknown,
            ReportProblemType::Archive => LogType::NeedsArchive,
            _ => LogType::NeedsMaintenance,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            ReportProblemType::NoProblem => "",
            ReportProblemType::LogFull => "The logbook is full.",
            ReportProblemType::Damaged => "The container is damaged.",
            ReportProblemType::Missing => "The cache might be missing.",
            ReportProblemType::Archive => "This cache should be archived.",
            ReportProblemType::Other => "There is a problem with this cache.",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ReportProblemType::NoProblem => "no_problem",
            ReportProblemType::LogFull => "log_full",
            ReportProblemType::Damaged => "damaged",
            ReportProblemType::Missing => "missing",
            ReportProblemType::Archive => "archive",
            ReportProblemType::Other => "other",
        }
    }
}

impl std::str::FromStr for ReportProblemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase().replace('-', "_");
        if s == "no_problem" || s == "none" {
            return Ok(ReportProblemType::NoProblem);
        }
        Self::PROBLEMS
            .into_iter()
            .find(|p| p.code() == s)
            .ok_or_else(|| format!("Unknown problem type '{s}'"))
    }
}
