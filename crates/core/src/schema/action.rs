//! Game-log events: the closed action vocabulary and the 31-column row.
//!
//! Raw log rows pass through [`RawEventRow::normalize`] first, which turns
//! empty cells into `None`. Typed conversion in [`ActionEvent::from_row`]
//! then only ever sees present values.

use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::CoreError;
use crate::threshold_validation::{validate_finite, validate_non_negative};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Column layout of a game-log file, in file order.
pub const GAME_LOG_COLUMNS: [&str; 31] = [
    "id",
    "action_id",
    "action_name",
    "player_id",
    "player_name",
    "team_id",
    "team_name",
    "opponent_id",
    "opponent_name",
    "opponent_team_id",
    "opponent_team_name",
    "teammate_id",
    "teammate_name",
    "half",
    "second",
    "pos_x",
    "pos_y",
    "possession_id",
    "possession_name",
    "possession_team_id",
    "possession_team_name",
    "possession_number",
    "possession_start_clear",
    "possession_end_clear",
    "playtype",
    "hand",
    "shot_type",
    "drive",
    "dribble_move",
    "contesting",
    "ts",
];

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// Basketball actions that can produce a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "3-")]
    MissedThreePointer,
    #[serde(rename = "Assisting")]
    Assisting,
    #[serde(rename = "Screen")]
    Screen,
    #[serde(rename = "Rebound")]
    Rebound,
    #[serde(rename = "Turnover")]
    Turnover,
    #[serde(rename = "1+")]
    MadeSingleFreeThrow,
    #[serde(rename = "1-")]
    MissedSingleFreeThrow,
    #[serde(rename = "2+1")]
    AndOne,
    #[serde(rename = "2-")]
    MissedTwoPointer,
    #[serde(rename = "2+")]
    MadeTwoPointer,
    #[serde(rename = "Foul")]
    Foul,
    #[serde(rename = "Pick'n'Roll")]
    PickAndRoll,
    #[serde(rename = "Post")]
    Post,
    #[serde(rename = "Steal")]
    Steal,
    #[serde(rename = "Technical foul")]
    TechnicalFoul,
    #[serde(rename = "3+")]
    MadeThreePointer,
    #[serde(rename = "2F")]
    SecondFoul,
    #[serde(rename = "3F")]
    ThirdFoul,
    #[serde(rename = "Unsportmanlike foul")]
    UnsportsmanlikeFoul,
    #[serde(rename = "3+1")]
    ThreePlusOne,
    #[serde(rename = "Second chance")]
    SecondChance,
    #[serde(rename = "2FT+")]
    MadeTwoFreeThrows,
    #[serde(rename = "2FT-")]
    MissedTwoFreeThrows,
    #[serde(rename = "3FT+")]
    MadeThreeFreeThrows,
    #[serde(rename = "3FT-")]
    MissedThreeFreeThrows,
    #[serde(rename = "Disqualifying foul")]
    DisqualifyingFoul,
}

impl ActionType {
    /// Every action, in declaration order.
    pub const ALL: [ActionType; 26] = [
        Self::MissedThreePointer,
        Self::Assisting,
        Self::Screen,
        Self::Rebound,
        Self::Turnover,
        Self::MadeSingleFreeThrow,
        Self::MissedSingleFreeThrow,
        Self::AndOne,
        Self::MissedTwoPointer,
        Self::MadeTwoPointer,
        Self::Foul,
        Self::PickAndRoll,
        Self::Post,
        Self::Steal,
        Self::TechnicalFoul,
        Self::MadeThreePointer,
        Self::SecondFoul,
        Self::ThirdFoul,
        Self::UnsportsmanlikeFoul,
        Self::ThreePlusOne,
        Self::SecondChance,
        Self::MadeTwoFreeThrows,
        Self::MissedTwoFreeThrows,
        Self::MadeThreeFreeThrows,
        Self::MissedThreeFreeThrows,
        Self::DisqualifyingFoul,
    ];

    /// The code used in game logs and annotation files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissedThreePointer => "3-",
            Self::Assisting => "Assisting",
            Self::Screen => "Screen",
            Self::Rebound => "Rebound",
            Self::Turnover => "Turnover",
            Self::MadeSingleFreeThrow => "1+",
            Self::MissedSingleFreeThrow => "1-",
            Self::AndOne => "2+1",
            Self::MissedTwoPointer => "2-",
            Self::MadeTwoPointer => "2+",
            Self::Foul => "Foul",
            Self::PickAndRoll => "Pick'n'Roll",
            Self::Post => "Post",
            Self::Steal => "Steal",
            Self::TechnicalFoul => "Technical foul",
            Self::MadeThreePointer => "3+",
            Self::SecondFoul => "2F",
            Self::ThirdFoul => "3F",
            Self::UnsportsmanlikeFoul => "Unsportmanlike foul",
            Self::ThreePlusOne => "3+1",
            Self::SecondChance => "Second chance",
            Self::MadeTwoFreeThrows => "2FT+",
            Self::MissedTwoFreeThrows => "2FT-",
            Self::MadeThreeFreeThrows => "3FT+",
            Self::MissedThreeFreeThrows => "3FT-",
            Self::DisqualifyingFoul => "Disqualifying foul",
        }
    }

    /// Look up an action by its log code. Unknown codes return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == code)
    }

    /// Parse a log code, rejecting anything outside the vocabulary.
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        Self::from_code(code).ok_or_else(|| {
            CoreError::Validation(format!("Unrecognized action type '{code}'"))
        })
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RawEventRow
// ---------------------------------------------------------------------------

/// One game-log row after empty-cell normalization, before typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEventRow {
    cells: Vec<Option<String>>,
}

impl RawEventRow {
    /// Normalize raw cells. The row must have exactly one cell per column.
    pub fn normalize<I, S>(cells: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cells: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| lenient::normalize_cell(c.as_ref()).map(str::to_string))
            .collect();
        if cells.len() != GAME_LOG_COLUMNS.len() {
            return Err(CoreError::Validation(format!(
                "game-log row must have {} columns, got {}",
                GAME_LOG_COLUMNS.len(),
                cells.len()
            )));
        }
        Ok(Self { cells })
    }

    /// Value of a named column; absent cells and unknown names are `None`.
    pub fn get(&self, column: &str) -> Option<&str> {
        GAME_LOG_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.cells[i].as_deref())
    }

    fn text(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_string)
    }

    fn int(&self, column: &str) -> Result<Option<i64>, CoreError> {
        self.get(column)
            .map(|v| lenient::parse_int_text(v, column))
            .transpose()
    }

    fn float(&self, column: &str) -> Result<Option<f64>, CoreError> {
        self.get(column)
            .map(|v| lenient::parse_float_text(v, column))
            .transpose()
    }

    fn id_text(&self, column: &str) -> Option<String> {
        self.get(column).map(lenient::canonical_id_text)
    }
}

// ---------------------------------------------------------------------------
// ActionEvent
// ---------------------------------------------------------------------------

/// One typed game-log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub action_id: Option<String>,
    pub action_name: ActionType,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub player_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_int")]
    pub team_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_int")]
    pub opponent_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub opponent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_int")]
    pub opponent_team_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub opponent_team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub teammate_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub teammate_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_int")]
    pub half: Option<i64>,
    #[serde(default)]
    pub second: Option<f64>,
    #[serde(default)]
    pub pos_x: Option<f64>,
    #[serde(default)]
    pub pos_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient::option_int")]
    pub possession_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub possession_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_int")]
    pub possession_team_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub possession_team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_int")]
    pub possession_number: Option<i64>,
    #[serde(default)]
    pub possession_start_clear: Option<f64>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub possession_end_clear: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub playtype: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub hand: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub shot_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub drive: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub dribble_move: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub contesting: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub ts: Option<String>,
}

impl ActionEvent {
    /// Type a normalized row. `id` and `action_name` are required; an
    /// action code outside [`ActionType`] is a validation error.
    pub fn from_row(row: &RawEventRow) -> Result<Self, CoreError> {
        let id = row
            .int("id")?
            .ok_or_else(|| CoreError::Validation("id is required".to_string()))?;
        let action_name = row
            .get("action_name")
            .ok_or_else(|| CoreError::Validation(format!("action_name is required (event {id})")))
            .and_then(ActionType::parse)?;

        let event = Self {
            id,
            action_id: row.id_text("action_id"),
            action_name,
            player_id: row.id_text("player_id"),
            player_name: row.text("player_name"),
            team_id: row.int("team_id")?,
            team_name: row.text("team_name"),
            opponent_id: row.int("opponent_id")?,
            opponent_name: row.text("opponent_name"),
            opponent_team_id: row.int("opponent_team_id")?,
            opponent_team_name: row.text("opponent_team_name"),
            teammate_id: row.id_text("teammate_id"),
            teammate_name: row.text("teammate_name"),
            half: row.int("half")?,
            second: row.float("second")?,
            pos_x: row.float("pos_x")?,
            pos_y: row.float("pos_y")?,
            possession_id: row.int("possession_id")?,
            possession_name: row.text("possession_name"),
            possession_team_id: row.int("possession_team_id")?,
            possession_team_name: row.text("possession_team_name"),
            possession_number: row.int("possession_number")?,
            possession_start_clear: row.float("possession_start_clear")?,
            possession_end_clear: row.text("possession_end_clear"),
            playtype: row.text("playtype"),
            hand: row.text("hand"),
            shot_type: row.text("shot_type"),
            drive: row.text("drive"),
            dribble_move: row.text("dribble_move"),
            contesting: row.text("contesting"),
            ts: row.text("ts"),
        };
        event.validate()?;
        Ok(event)
    }

    /// Every optional text field with its column name.
    fn text_fields(&self) -> [(&'static str, &Option<String>); 18] {
        [
            ("action_id", &self.action_id),
            ("player_id", &self.player_id),
            ("player_name", &self.player_name),
            ("team_name", &self.team_name),
            ("opponent_name", &self.opponent_name),
            ("opponent_team_name", &self.opponent_team_name),
            ("teammate_id", &self.teammate_id),
            ("teammate_name", &self.teammate_name),
            ("possession_name", &self.possession_name),
            ("possession_team_name", &self.possession_team_name),
            ("possession_end_clear", &self.possession_end_clear),
            ("playtype", &self.playtype),
            ("hand", &self.hand),
            ("shot_type", &self.shot_type),
            ("drive", &self.drive),
            ("dribble_move", &self.dribble_move),
            ("contesting", &self.contesting),
            ("ts", &self.ts),
        ]
    }

    /// Text fields must already be normalized: present values are non-empty
    /// and carry no surrounding whitespace.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in self.text_fields() {
            if let Some(text) = value {
                if lenient::normalize_cell(text) != Some(text.as_str()) {
                    return Err(CoreError::Validation(format!(
                        "{name} must be non-empty without surrounding whitespace, got {text:?}"
                    )));
                }
            }
        }
        if let Some(second) = self.second {
            validate_non_negative(second, "second")?;
        }
        if let Some(x) = self.pos_x {
            validate_finite(x, "pos_x")?;
        }
        if let Some(y) = self.pos_y {
            validate_finite(y, "pos_y")?;
        }
        if let Some(clear) = self.possession_start_clear {
            validate_finite(clear, "possession_start_clear")?;
        }
        Ok(())
    }
}
