use crate::config::Config;
use crate::models::{GameweekResult, Pick, PlayerRecord, Position, Roster};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Response from `bootstrap-static/`
#[derive(Debug, Deserialize)]
struct BootstrapStatic {
    elements: Vec<FplElement>,
    #[serde(default)]
    teams: Vec<FplTeam>,
}

/// Player entry from `bootstrap-static/`
#[derive(Debug, Deserialize)]
struct FplElement {
    id: u32,
    first_name: String,
    second_name: String,
    web_name: String,
    team: u32,
    element_type: u8,
    total_points: i32,
    now_cost: i32,
}

#[derive(Debug, Deserialize)]
struct FplTeam {
    id: u32,
    #[serde(default)]
    short_name: String,
    name: String,
}

/// Response from `element-summary/{id}/`
#[derive(Debug, Deserialize)]
struct ElementSummary {
    #[serde(default)]
    history: Vec<GameweekResult>,
}

/// Response from `entry/{id}/`
#[derive(Debug, Deserialize)]
struct EntrySummary {
    current_event: Option<u32>,
}

/// Response from `entry/{id}/event/{gw}/picks/`
#[derive(Debug, Deserialize)]
struct EntryPicks {
    picks: Vec<Pick>,
}

/// A manager's squad for one gameweek
#[derive(Debug, Clone)]
pub struct TeamPicks {
    pub team_id: u64,
    pub event: u32,
    pub picks: Vec<Pick>,
}

#[derive(Debug, Clone)]
pub struct FplApiClient {
    base_url: String,
    client: Client,
}

impl FplApiClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json,text/html;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://fantasy.premierleague.com/"),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.fpl_api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch every player and team of the season
    pub async fn fetch_roster(&self) -> Result<Roster, reqwest::Error> {
        let url = format!("{}/bootstrap-static/", self.base_url);
        let data: BootstrapStatic = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let teams: HashMap<u32, String> = data
            .teams
            .into_iter()
            .map(|team| {
                let label = if team.short_name.is_empty() {
                    team.name
                } else {
                    team.short_name
                };
                (team.id, label)
            })
            .collect();

        let players: Vec<PlayerRecord> = data
            .elements
            .into_iter()
            .filter_map(|element| {
                let Some(position) = Position::from_element_type(element.element_type) else {
                    warn!(
                        player_id = element.id,
                        element_type = element.element_type,
                        "skipping player with unknown element type"
                    );
                    return None;
                };
                Some(PlayerRecord {
                    id: element.id,
                    first_name: element.first_name,
                    second_name: element.second_name,
                    web_name: element.web_name,
                    team: element.team,
                    position,
                    now_cost: element.now_cost,
                    total_points: element.total_points,
                })
            })
            .collect();

        debug!(players = players.len(), teams = teams.len(), "fetched roster");
        Ok(Roster { players, teams })
    }

    /// Fetch a player's per-gameweek history for the current season
    pub async fn fetch_player_history(
        &self,
        player_id: u32,
    ) -> Result<Vec<GameweekResult>, reqwest::Error> {
        let url = format!("{}/element-summary/{}/", self.base_url, player_id);
        let summary: ElementSummary = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(summary.history)
    }

    /// Fetch a manager's picks for their current gameweek
    pub async fn fetch_team_picks(&self, team_id: u64) -> Result<TeamPicks, reqwest::Error> {
        let url = format!("{}/entry/{}/", self.base_url, team_id);
        let entry: EntrySummary = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Before the season starts there is no current event yet
        let event = entry.current_event.unwrap_or(1);

        let url = format!("{}/entry/{}/event/{}/picks/", self.base_url, team_id, event);
        let picks: EntryPicks = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(TeamPicks {
            team_id,
            event,
            picks: picks.picks,
        })
    }
}
