/// Terminal status of a logging operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    NoError,
    LogPostError,
    LogImagePostError,
    CommunicationError,
    DatabaseError,
    AlreadyRunning,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::NoError => "ok",
            StatusCode::LogPostError => "log post error",
            StatusCode::LogImagePostError => "log image post error",
            StatusCode::CommunicationError => "communication error",
            StatusCode::DatabaseError => "database error",
            StatusCode::AlreadyRunning => "already running",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LogError {
    pub status: StatusCode,
    pub message: String,
}

impl LogError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn log_post(message: impl Into<String>) -> Self {
        Self::new(StatusCode::LogPostError, message)
    }

    pub fn image_post(message: impl Into<String>) -> Self {
        Self::new(StatusCode::LogImagePostError, message)
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            StatusCode::LogPostError => write!(f, "Log Post Error: {}", self.message),
            StatusCode::LogImagePostError => write!(f, "Log Image Post Error: {}", self.message),
            StatusCode::CommunicationError => write!(f, "Communication Error: {}", self.message),
            StatusCode::DatabaseError => write!(f, "Database Error: {}", self.message),
            StatusCode::AlreadyRunning => write!(f, "Already Running: {}", self.message),
            StatusCode::NoError => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for LogError {}

impl From<sqlx::Error> for LogError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {err}");
        LogError::new(StatusCode::DatabaseError, err.to_string())
    }
}
