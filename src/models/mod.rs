use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Predicted points keyed by the player name exactly as the prediction site prints it
pub type Predictions = HashMap<String, f64>;

/// Playing position, mapped from the FPL `element_type` code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Map an FPL `element_type` (1-4) to a position
    pub fn from_element_type(element_type: u8) -> Option<Self> {
        match element_type {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown position {0:?} (expected goalkeeper, defender, midfielder or forward)")]
pub struct ParsePositionError(String);

impl FromStr for Position {
    type Err = ParsePositionError;

    /// Accepts the full label or the FPL short code, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goalkeeper" | "gkp" | "gk" => Ok(Position::Goalkeeper),
            "defender" | "def" => Ok(Position::Defender),
            "midfielder" | "mid" => Ok(Position::Midfielder),
            "forward" | "fwd" => Ok(Position::Forward),
            _ => Err(ParsePositionError(s.to_string())),
        }
    }
}

/// A player as published by the official FPL API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    pub web_name: String,
    pub team: u32,
    pub position: Position,
    pub now_cost: i32, // tenths of a million
    pub total_points: i32,
}

impl PlayerRecord {
    pub fn price(&self) -> f64 {
        self.now_cost as f64 / 10.0
    }
}

/// All players known for the season, plus team short names by team id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub players: Vec<PlayerRecord>,
    pub teams: HashMap<u32, String>,
}

impl Roster {
    /// Short team name, falling back to the numeric id
    pub fn team_name(&self, team_id: u32) -> String {
        self.teams
            .get(&team_id)
            .cloned()
            .unwrap_or_else(|| team_id.to_string())
    }
}

/// Points a player scored in one gameweek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekResult {
    pub round: u32,
    pub total_points: i32,
}

/// A player selected in a manager's squad for a gameweek
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub element: u32,
    #[serde(default)]
    pub position: u8, // squad slot, 1-15
    #[serde(default = "default_multiplier")]
    pub multiplier: u8,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
}

fn default_multiplier() -> u8 {
    1
}

/// One dashboard row: a player joined with form and predicted points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Position")]
    pub position: Position,
    #[serde(rename = "Total Points")]
    pub total_points: i32,
    #[serde(rename = "Last 5 Games")]
    pub last_5: i32,
    #[serde(rename = "Last 3 Games")]
    pub last_3: i32,
    #[serde(rename = "Last Game")]
    pub last_1: i32,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Predicted Points")]
    pub predicted_points: f64,
    #[serde(rename = "Total Expected Points")]
    pub total_expected_points: f64,
}

impl ReconciledRow {
    /// Format the row as a single readable line
    pub fn format(&self) -> String {
        format!(
            "{:<20} {:<5} {:<10} | Pts: {:>3} | L5: {:>3} | L3: {:>3} | L1: {:>3} | £{:.1}m | Pred: {:.1} | Exp: {:.1}",
            self.name,
            self.team,
            self.position,
            self.total_points,
            self.last_5,
            self.last_3,
            self.last_1,
            self.price,
            self.predicted_points,
            self.total_expected_points
        )
    }
}
