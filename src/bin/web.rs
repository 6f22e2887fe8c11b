use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use fpl_stats::charts::{bar_chart, ChartBar};
use fpl_stats::filters::{compare_players, sort_rows, RowFilter, SortColumn, MAX_COMPARE};
use fpl_stats::{parse_team_id, Config, Position, ReconciledRow, StatsService};
use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

// Custom filters for formatting
mod filters {
    pub fn format_price(value: &f64) -> ::askama::Result<String> {
        Ok(format!("£{:.1}m", value))
    }

    pub fn format_points(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.1}", value))
    }
}

struct SelectOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "players.html")]
struct PlayersTemplate {
    active_page: String,
    loaded_at: Option<String>,
    error: Option<String>,
    min_price: f64,
    min_points: i32,
    positions: Vec<SelectOption>,
    sort_options: Vec<SelectOption>,
    descending: bool,
    total_count: usize,
    rows: Vec<ReconciledRow>,
}

#[derive(Template)]
#[template(path = "compare.html")]
struct CompareTemplate {
    active_page: String,
    error: Option<String>,
    players: String,
    max_compare: usize,
    rows: Vec<ReconciledRow>,
    total_points_chart: Vec<ChartBar>,
    predicted_points_chart: Vec<ChartBar>,
}

#[derive(Template)]
#[template(path = "team.html")]
struct TeamTemplate {
    active_page: String,
    team_id: String,
    error: Option<String>,
    rows: Vec<ReconciledRow>,
}

/// The all-players table, computed at startup and on refresh
#[derive(Clone)]
struct PlayerTable {
    rows: Vec<ReconciledRow>,
    loaded_at: DateTime<Utc>,
}

#[derive(Clone)]
struct AppState {
    service: Arc<StatsService>,
    players: Arc<RwLock<Result<PlayerTable, String>>>,
}

/// Treat `?min_price=` the same as a missing parameter
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Default, Deserialize)]
struct PlayersQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_price: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_points: Option<i32>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sort: Option<SortColumn>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    desc: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct CompareQuery {
    #[serde(default)]
    players: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TeamQuery {
    #[serde(default)]
    team_id: Option<String>,
}

async fn load_player_table(service: &StatsService) -> Result<PlayerTable, String> {
    match service.players_with_points().await {
        Ok(rows) => {
            info!(players = rows.len(), "player table loaded");
            Ok(PlayerTable {
                rows,
                loaded_at: Utc::now(),
            })
        }
        Err(e) => {
            error!(error = %e, "failed to load player table");
            Err(e.to_string())
        }
    }
}

async fn players(
    State(state): State<AppState>,
    Query(query): Query<PlayersQuery>,
) -> impl IntoResponse {
    let table = state.players.read().await.clone();

    // "All" or anything unrecognised means no position filter
    let position = query
        .position
        .as_deref()
        .and_then(|p| p.parse::<Position>().ok());
    let filter = RowFilter {
        min_price: query.min_price.unwrap_or(0.0),
        min_points: query.min_points.unwrap_or(0),
        position,
    };
    let sort = query.sort.unwrap_or_default();
    let descending = query.desc.unwrap_or(true);

    let (rows, total_count, loaded_at, error) = match table {
        Ok(table) => {
            let mut rows = filter.apply(&table.rows);
            sort_rows(&mut rows, sort, descending);
            (
                rows,
                table.rows.len(),
                Some(table.loaded_at.format("%Y-%m-%d %H:%M UTC").to_string()),
                None,
            )
        }
        Err(e) => (
            Vec::new(),
            0,
            None,
            Some(format!("Error loading player data: {}", e)),
        ),
    };

    let mut positions = vec![SelectOption {
        value: "All",
        label: "All",
        selected: position.is_none(),
    }];
    positions.extend(Position::ALL.iter().map(|p| SelectOption {
        value: p.label(),
        label: p.label(),
        selected: Some(*p) == position,
    }));

    let sort_options = SortColumn::ALL
        .iter()
        .map(|column| SelectOption {
            value: column.key(),
            label: column.label(),
            selected: *column == sort,
        })
        .collect();

    let template = PlayersTemplate {
        active_page: "players".to_string(),
        loaded_at,
        error,
        min_price: filter.min_price,
        min_points: filter.min_points,
        positions,
        sort_options,
        descending,
        total_count,
        rows,
    };

    template
}

async fn compare(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> impl IntoResponse {
    let players = query.players.unwrap_or_default();
    let names: Vec<String> = players.split(',').map(|s| s.trim().to_string()).collect();

    let (rows, error) = match state.players.read().await.as_ref() {
        Ok(table) => (compare_players(&table.rows, &names), None),
        Err(e) => (Vec::new(), Some(format!("Error loading comparison data: {}", e))),
    };

    let template = CompareTemplate {
        active_page: "compare".to_string(),
        error,
        players,
        max_compare: MAX_COMPARE,
        total_points_chart: bar_chart(&rows, |r| r.total_points as f64),
        predicted_points_chart: bar_chart(&rows, |r| r.predicted_points),
        rows,
    };

    template
}

async fn team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> impl IntoResponse {
    let team_id = query.team_id.unwrap_or_default();

    let (rows, error) = if team_id.trim().is_empty() {
        (Vec::new(), None)
    } else {
        let result = match parse_team_id(&team_id) {
            Ok(id) => state.service.team_players(id).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(rows) => (rows, None),
            Err(e) => {
                error!(team_id = %team_id, error = %e, "failed to load team");
                (
                    Vec::new(),
                    Some(format!(
                        "Failed to load team data. Please check your team ID. Error details: {}",
                        e
                    )),
                )
            }
        }
    };

    let template = TeamTemplate {
        active_page: "team".to_string(),
        team_id,
        error,
        rows,
    };

    template
}

/// Refetch the roster and rebuild the all-players table
async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    let table = match state.service.reload_roster().await {
        Ok(_) => load_player_table(&state.service).await,
        Err(e) => {
            error!(error = %e, "failed to reload roster");
            Err(e.to_string())
        }
    };
    *state.players.write().await = table;

    Redirect::to("/")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();
    let service = Arc::new(StatsService::new(config)?);

    println!("Fetching player data...");

    // Fetch data on startup
    let table = load_player_table(&service).await;
    match &table {
        Ok(table) => println!("Data loaded successfully: {} players", table.rows.len()),
        Err(e) => {
            eprintln!("Error fetching data: {}", e);
            eprintln!("Server will start but pages may show errors; POST /refresh to retry");
        }
    }

    let state = AppState {
        service,
        players: Arc::new(RwLock::new(table)),
    };

    println!("\nStarting web server at http://{}", bind_addr);
    println!("Press Ctrl+C to stop\n");

    // Build router with routes
    let app = Router::new()
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(players))
        .route("/compare", get(compare))
        .route("/team", get(team))
        .route("/refresh", post(refresh))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    // Run server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
