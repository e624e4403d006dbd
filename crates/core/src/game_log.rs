//! Reading semicolon-separated game-log exports.
//!
//! The first line is a header and is not interpreted; columns are taken
//! positionally in [`GAME_LOG_COLUMNS`] order. Rows with the wrong column
//! count are logged and dropped so one bad export line does not lose a game.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CoreError;
use crate::schema::{RawEventRow, GAME_LOG_COLUMNS};

/// Field delimiter of game-log files.
pub const GAME_LOG_DELIMITER: u8 = b';';

/// Read every well-formed row of the game log at `path`.
pub fn read_game_log(path: &Path) -> Result<Vec<RawEventRow>, CoreError> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let rows = parse_game_log(file, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Read game log");
    Ok(rows)
}

/// Parse game-log text from any reader. `source` only labels log messages.
pub fn parse_game_log<R: Read>(reader: R, source: &str) -> Result<Vec<RawEventRow>, CoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(GAME_LOG_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| {
            CoreError::Validation(format!("{source}: unreadable game-log record: {e}"))
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match RawEventRow::normalize(record.iter()) {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(
                source,
                line,
                expected = GAME_LOG_COLUMNS.len(),
                error = %e,
                "Skipping malformed game-log row",
            ),
        }
    }
    Ok(rows)
}
