use crate::models::{Pick, PlayerRecord, Predictions, ReconciledRow, Roster};
use crate::utils::history::PointsSummary;
use crate::utils::names::player_name_variations;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// A pick that refers to a player the roster does not know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("player {player_id} is not in the roster")]
pub struct UnknownPick {
    pub player_id: u32,
}

/// Look up a player's predicted points. The first name variation that is a
/// key of `predictions` wins; returns the matched key and its value.
pub fn match_prediction<'a>(
    player: &PlayerRecord,
    predictions: &'a Predictions,
) -> Option<(&'a str, f64)> {
    player_name_variations(player)
        .iter()
        .find_map(|name| predictions.get_key_value(name.as_str()))
        .map(|(name, &points)| (name.as_str(), points))
}

/// Join one player with their form summary and predicted points
pub fn reconcile_player(
    player: &PlayerRecord,
    team: String,
    summary: PointsSummary,
    predictions: &Predictions,
) -> ReconciledRow {
    let predicted_points = match match_prediction(player, predictions) {
        Some((matched, points)) => {
            debug!(player = %player.web_name, matched, "matched predicted points");
            points
        }
        None => 0.0,
    };

    ReconciledRow {
        id: player.id,
        name: player.web_name.clone(),
        team,
        position: player.position,
        total_points: player.total_points,
        last_5: summary.last_5,
        last_3: summary.last_3,
        last_1: summary.last_1,
        price: player.price(),
        predicted_points,
        total_expected_points: summary.last_5 as f64 + predicted_points,
    }
}

/// Build one row per player, in the order given. Players missing from
/// `summaries` get a zero summary.
pub fn reconcile_players(
    roster: &Roster,
    players: &[&PlayerRecord],
    summaries: &HashMap<u32, PointsSummary>,
    predictions: &Predictions,
) -> Vec<ReconciledRow> {
    players
        .iter()
        .map(|player| {
            let summary = summaries.get(&player.id).copied().unwrap_or_default();
            reconcile_player(player, roster.team_name(player.team), summary, predictions)
        })
        .collect()
}

/// Restrict the roster to a team's picks, keeping pick order
pub fn select_picks<'a>(
    roster: &'a Roster,
    picks: &[Pick],
) -> Result<Vec<&'a PlayerRecord>, UnknownPick> {
    let by_id: HashMap<u32, &PlayerRecord> = roster.players.iter().map(|p| (p.id, p)).collect();

    picks
        .iter()
        .map(|pick| {
            by_id.get(&pick.element).copied().ok_or(UnknownPick {
                player_id: pick.element,
            })
        })
        .collect()
}
