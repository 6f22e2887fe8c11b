use fpl_stats::{Config, Position, ReconciledRow, StatsError, StatsService};
use mockito::{Mock, Server, ServerGuard};

const BOOTSTRAP: &str = include_str!("fixtures/bootstrap_static.json");
const PREDICTIONS: &str = include_str!("fixtures/predicted_points.html");

fn config(server: &ServerGuard) -> Config {
    Config {
        fpl_api_base_url: format!("{}/api", server.url()),
        predictions_url: format!("{}/fpl-predicted-points", server.url()),
        ..Config::default()
    }
}

async fn json_mock(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Histories: Salah has two rounds, Haaland's request fails, Pickford has none
async fn mock_histories(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        json_mock(
            server,
            "/api/element-summary/1/",
            r#"{"history": [{"round": 1, "total_points": 10}, {"round": 2, "total_points": 5}]}"#,
        )
        .await,
        server
            .mock("GET", "/api/element-summary/2/")
            .with_status(500)
            .create_async()
            .await,
        json_mock(server, "/api/element-summary/3/", r#"{"history": []}"#).await,
    ]
}

async fn mock_predictions(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("GET", "/fpl-predicted-points")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(PREDICTIONS)
        .expect(hits)
        .create_async()
        .await
}

fn row<'a>(rows: &'a [ReconciledRow], name: &str) -> &'a ReconciledRow {
    rows.iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no row for {}", name))
}

#[tokio::test]
async fn players_with_points_joins_all_sources() {
    let mut server = Server::new_async().await;
    let bootstrap = json_mock(&mut server, "/api/bootstrap-static/", BOOTSTRAP).await;
    let _histories = mock_histories(&mut server).await;
    let predictions = mock_predictions(&mut server, 1).await;

    let service = StatsService::new(config(&server)).unwrap();
    let rows = service.players_with_points().await.unwrap();

    // The manager entry with element_type 5 is not a player
    assert_eq!(rows.len(), 3);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Salah", "Haaland", "Pickford"]);

    let salah = row(&rows, "Salah");
    assert_eq!(salah.team, "LIV");
    assert_eq!(salah.position, Position::Midfielder);
    assert_eq!((salah.last_5, salah.last_3, salah.last_1), (15, 15, 5));
    assert!((salah.predicted_points - 7.2).abs() < 1e-9);
    assert!((salah.total_expected_points - 22.2).abs() < 1e-9);
    assert!((salah.price - 13.0).abs() < 1e-9);

    // History request failed: zeros, but still matched by display name
    let haaland = row(&rows, "Haaland");
    assert_eq!((haaland.last_5, haaland.last_3, haaland.last_1), (0, 0, 0));
    assert!((haaland.predicted_points - 8.1).abs() < 1e-9);
    assert!((haaland.total_expected_points - 8.1).abs() < 1e-9);

    // Only in the second table, which is ignored
    let pickford = row(&rows, "Pickford");
    assert_eq!(pickford.predicted_points, 0.0);
    assert_eq!(pickford.total_expected_points, 0.0);

    bootstrap.assert_async().await;
    predictions.assert_async().await;
}

#[tokio::test]
async fn predictions_outage_degrades_to_zero() {
    let mut server = Server::new_async().await;
    let _bootstrap = json_mock(&mut server, "/api/bootstrap-static/", BOOTSTRAP).await;
    let _histories = mock_histories(&mut server).await;
    let _predictions = server
        .mock("GET", "/fpl-predicted-points")
        .with_status(503)
        .create_async()
        .await;

    let service = StatsService::new(config(&server)).unwrap();
    let rows = service.players_with_points().await.unwrap();

    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.predicted_points, 0.0);
        assert_eq!(row.total_expected_points, row.last_5 as f64);
    }
}

#[tokio::test]
async fn roster_failure_is_reported() {
    let mut server = Server::new_async().await;
    let _bootstrap = server
        .mock("GET", "/api/bootstrap-static/")
        .with_status(502)
        .create_async()
        .await;

    let service = StatsService::new(config(&server)).unwrap();
    let err = service.players_with_points().await.unwrap_err();

    assert!(matches!(err, StatsError::Roster(_)));
    assert!(err.to_string().starts_with("Failed to fetch player data"));
}

#[tokio::test]
async fn team_players_follow_pick_order() {
    let mut server = Server::new_async().await;
    let _bootstrap = json_mock(&mut server, "/api/bootstrap-static/", BOOTSTRAP).await;
    let _histories = mock_histories(&mut server).await;
    let predictions = mock_predictions(&mut server, 1).await;
    let _entry = json_mock(&mut server, "/api/entry/77/", r#"{"id": 77, "current_event": 3}"#).await;
    let _picks = json_mock(
        &mut server,
        "/api/entry/77/event/3/picks/",
        r#"{"picks": [
            {"element": 3, "position": 1, "multiplier": 1, "is_captain": false, "is_vice_captain": false},
            {"element": 1, "position": 2, "multiplier": 2, "is_captain": true, "is_vice_captain": false}
        ]}"#,
    )
    .await;

    let service = StatsService::new(config(&server)).unwrap();
    let rows = service.team_players(77).await.unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Pickford", "Salah"]);
    assert!((rows[1].total_expected_points - 22.2).abs() < 1e-9);

    predictions.assert_async().await;
}

#[tokio::test]
async fn team_before_season_uses_first_event() {
    let mut server = Server::new_async().await;
    let _bootstrap = json_mock(&mut server, "/api/bootstrap-static/", BOOTSTRAP).await;
    let _histories = mock_histories(&mut server).await;
    let _predictions = mock_predictions(&mut server, 1).await;
    let _entry = json_mock(&mut server, "/api/entry/5/", r#"{"id": 5, "current_event": null}"#).await;
    let picks = json_mock(
        &mut server,
        "/api/entry/5/event/1/picks/",
        r#"{"picks": [{"element": 2}]}"#,
    )
    .await;

    let service = StatsService::new(config(&server)).unwrap();
    let rows = service.team_players(5).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Haaland");
    picks.assert_async().await;
}

#[tokio::test]
async fn unknown_team_reports_team_id() {
    let mut server = Server::new_async().await;
    let _entry = server
        .mock("GET", "/api/entry/404404/")
        .with_status(404)
        .create_async()
        .await;

    let service = StatsService::new(config(&server)).unwrap();
    let err = service.team_players(404404).await.unwrap_err();

    assert!(matches!(err, StatsError::Team { team_id: 404404, .. }));
    assert!(err.to_string().contains("404404"));
}

#[tokio::test]
async fn pick_missing_from_roster_fails_the_team() {
    let mut server = Server::new_async().await;
    let _bootstrap = json_mock(&mut server, "/api/bootstrap-static/", BOOTSTRAP).await;
    let _entry = json_mock(&mut server, "/api/entry/8/", r#"{"current_event": 2}"#).await;
    let _picks = json_mock(
        &mut server,
        "/api/entry/8/event/2/picks/",
        r#"{"picks": [{"element": 1}, {"element": 555}]}"#,
    )
    .await;

    let service = StatsService::new(config(&server)).unwrap();
    let err = service.team_players(8).await.unwrap_err();

    assert!(matches!(
        err,
        StatsError::UnknownPick {
            team_id: 8,
            player_id: 555
        }
    ));
}

#[tokio::test]
async fn roster_and_predictions_are_memoized() {
    let mut server = Server::new_async().await;
    let bootstrap = server
        .mock("GET", "/api/bootstrap-static/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(BOOTSTRAP)
        .expect(1)
        .create_async()
        .await;
    let _histories = mock_histories(&mut server).await;
    let predictions = mock_predictions(&mut server, 1).await;

    let config = Config {
        predictions_ttl_minutes: 10,
        ..config(&server)
    };
    let service = StatsService::new(config).unwrap();

    let first = service.players_with_points().await.unwrap();
    let second = service.players_with_points().await.unwrap();
    assert_eq!(first, second);

    bootstrap.assert_async().await;
    predictions.assert_async().await;
}

#[tokio::test]
async fn without_ttl_each_batch_fetches_predictions_once() {
    let mut server = Server::new_async().await;
    let bootstrap = server
        .mock("GET", "/api/bootstrap-static/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(BOOTSTRAP)
        .expect(2)
        .create_async()
        .await;
    let _histories = mock_histories(&mut server).await;
    let predictions = mock_predictions(&mut server, 2).await;

    let service = StatsService::new(config(&server)).unwrap();
    service.players_with_points().await.unwrap();
    service.reload_roster().await.unwrap();
    service.players_with_points().await.unwrap();

    bootstrap.assert_async().await;
    predictions.assert_async().await;
}

#[tokio::test]
async fn oversized_settings_do_not_panic() {
    let mut server = Server::new_async().await;
    let _bootstrap = json_mock(&mut server, "/api/bootstrap-static/", BOOTSTRAP).await;
    let _histories = mock_histories(&mut server).await;
    let predictions = mock_predictions(&mut server, 1).await;

    let config = Config {
        predictions_ttl_minutes: i64::MAX,
        history_concurrency: usize::MAX,
        ..config(&server)
    };
    let service = StatsService::new(config).unwrap();

    let first = service.predictions().await;
    let second = service.predictions().await;
    assert_eq!(first, second);
    assert_eq!(service.players_with_points().await.unwrap().len(), 3);

    predictions.assert_async().await;
}
