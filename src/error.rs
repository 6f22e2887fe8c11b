use thiserror::Error;

/// Failures that make a whole batch meaningless. Per-row and per-player
/// problems never show up here; they degrade to empty or zeroed data.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to fetch player data: {0}")]
    Roster(#[source] reqwest::Error),

    #[error("Failed to fetch team data for team {team_id}: {source}")]
    Team {
        team_id: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid team ID {0:?}: expected a positive number")]
    InvalidTeamId(String),

    #[error("Team {team_id} picked player {player_id}, who is not in the current roster")]
    UnknownPick { team_id: u64, player_id: u32 },
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Parse a team ID typed by a user
pub fn parse_team_id(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(StatsError::InvalidTeamId(raw.to_string())),
    }
}
