/// Frame indices are signed: a clip window may start before frame 0.
pub type FrameIndex = i64;

/// Game identifiers are the leading integer of a replay file name.
pub type GameId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
