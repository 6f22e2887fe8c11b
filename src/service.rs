use crate::api::fpl_api::FplApiClient;
use crate::config::Config;
use crate::error::{Result, StatsError};
use crate::models::{PlayerRecord, Predictions, ReconciledRow, Roster};
use crate::scrapers::fplform::PredictedPointsScraper;
use crate::utils::history::PointsSummary;
use crate::utils::reconcile::{reconcile_players, select_picks};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

struct CachedPredictions {
    fetched_at: DateTime<Utc>,
    predictions: Arc<Predictions>,
}

/// Owns the API clients and the session's roster snapshot, and runs the
/// batch joins behind every dashboard view.
pub struct StatsService {
    config: Config,
    api: FplApiClient,
    scraper: PredictedPointsScraper,
    roster: RwLock<Option<Arc<Roster>>>,
    predictions: Mutex<Option<CachedPredictions>>,
}

impl StatsService {
    pub fn new(config: Config) -> Result<Self> {
        let api = FplApiClient::new(&config).map_err(StatsError::HttpClient)?;
        let scraper = PredictedPointsScraper::new(&config).map_err(StatsError::HttpClient)?;

        Ok(Self {
            config,
            api,
            scraper,
            roster: RwLock::new(None),
            predictions: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The roster snapshot, fetched on first use
    pub async fn roster(&self) -> Result<Arc<Roster>> {
        if let Some(roster) = self.roster.read().await.as_ref() {
            return Ok(Arc::clone(roster));
        }
        self.reload_roster().await
    }

    /// Replace the roster snapshot with a fresh fetch
    pub async fn reload_roster(&self) -> Result<Arc<Roster>> {
        let roster = Arc::new(self.api.fetch_roster().await.map_err(StatsError::Roster)?);
        info!(players = roster.players.len(), "loaded roster");
        *self.roster.write().await = Some(Arc::clone(&roster));
        Ok(roster)
    }

    /// Predicted points for one batch. Memoized only when a TTL is set and the
    /// last fetch found something.
    pub async fn predictions(&self) -> Arc<Predictions> {
        let ttl = self.config.predictions_ttl_minutes;
        let mut cached = self.predictions.lock().await;

        if ttl > 0 {
            if let Some(entry) = cached.as_ref() {
                let max_age = Duration::try_minutes(ttl).unwrap_or(Duration::MAX);
                if Utc::now() - entry.fetched_at < max_age {
                    return Arc::clone(&entry.predictions);
                }
            }
        }

        let predictions = Arc::new(self.scraper.fetch_predictions().await);
        *cached = if ttl > 0 && !predictions.is_empty() {
            Some(CachedPredictions {
                fetched_at: Utc::now(),
                predictions: Arc::clone(&predictions),
            })
        } else {
            None
        };
        predictions
    }

    /// Every player in the roster with form and predicted points
    pub async fn players_with_points(&self) -> Result<Vec<ReconciledRow>> {
        let roster = self.roster().await?;
        let predictions = self.predictions().await;

        let players: Vec<&PlayerRecord> = roster.players.iter().collect();
        let summaries = self.summarize_histories(&players).await;

        Ok(reconcile_players(&roster, &players, &summaries, &predictions))
    }

    /// The players in a manager's squad for their current gameweek
    pub async fn team_players(&self, team_id: u64) -> Result<Vec<ReconciledRow>> {
        let team = self
            .api
            .fetch_team_picks(team_id)
            .await
            .map_err(|source| StatsError::Team { team_id, source })?;
        info!(
            team_id = team.team_id,
            event = team.event,
            picks = team.picks.len(),
            "fetched team picks"
        );

        let roster = self.roster().await?;
        let players = select_picks(&roster, &team.picks).map_err(|e| StatsError::UnknownPick {
            team_id,
            player_id: e.player_id,
        })?;

        let predictions = self.predictions().await;
        let summaries = self.summarize_histories(&players).await;

        Ok(reconcile_players(&roster, &players, &summaries, &predictions))
    }

    /// Fetch and summarize histories concurrently. A player whose history
    /// cannot be fetched gets a zero summary.
    async fn summarize_histories(&self, players: &[&PlayerRecord]) -> HashMap<u32, PointsSummary> {
        let semaphore = Arc::new(Semaphore::new(
            self.config.history_concurrency.clamp(1, Semaphore::MAX_PERMITS),
        ));
        let mut tasks = JoinSet::new();

        for player in players {
            let api = self.api.clone();
            let semaphore = Arc::clone(&semaphore);
            let player_id = player.id;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let summary = match api.fetch_player_history(player_id).await {
                    Ok(history) => PointsSummary::from_history(&history),
                    Err(e) => {
                        warn!(player_id, error = %e, "failed to fetch player history");
                        PointsSummary::default()
                    }
                };
                (player_id, summary)
            });
        }

        let mut summaries = HashMap::with_capacity(players.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((player_id, summary)) => {
                    summaries.insert(player_id, summary);
                }
                Err(e) => warn!(error = %e, "history task failed"),
            }
        }
        summaries
    }
}
