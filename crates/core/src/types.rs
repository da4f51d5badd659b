/// Task identifiers are UUID v4, generated by the service at submission.
pub type TaskId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
