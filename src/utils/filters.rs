use crate::models::{Position, ReconciledRow};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

/// Most players the comparison view will show side by side
pub const MAX_COMPARE: usize = 5;

/// Dashboard filters for the all-players table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub min_price: f64,
    pub min_points: i32,
    pub position: Option<Position>,
}

impl RowFilter {
    pub fn matches(&self, row: &ReconciledRow) -> bool {
        row.price >= self.min_price
            && row.total_points >= self.min_points
            && self.position.map_or(true, |p| row.position == p)
    }

    pub fn apply(&self, rows: &[ReconciledRow]) -> Vec<ReconciledRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    Position,
    TotalPoints,
    Last5,
    Last3,
    LastGame,
    Price,
    PredictedPoints,
    #[default]
    TotalExpectedPoints,
}

impl SortColumn {
    pub const ALL: [SortColumn; 9] = [
        SortColumn::Name,
        SortColumn::Position,
        SortColumn::TotalPoints,
        SortColumn::Last5,
        SortColumn::Last3,
        SortColumn::LastGame,
        SortColumn::Price,
        SortColumn::PredictedPoints,
        SortColumn::TotalExpectedPoints,
    ];

    /// Key used in query strings
    pub fn key(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Position => "position",
            SortColumn::TotalPoints => "total_points",
            SortColumn::Last5 => "last5",
            SortColumn::Last3 => "last3",
            SortColumn::LastGame => "last_game",
            SortColumn::Price => "price",
            SortColumn::PredictedPoints => "predicted_points",
            SortColumn::TotalExpectedPoints => "total_expected_points",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Position => "Position",
            SortColumn::TotalPoints => "Total Points",
            SortColumn::Last5 => "Last 5 Games",
            SortColumn::Last3 => "Last 3 Games",
            SortColumn::LastGame => "Last Game",
            SortColumn::Price => "Price",
            SortColumn::PredictedPoints => "Predicted Points",
            SortColumn::TotalExpectedPoints => "Total Expected Points",
        }
    }

    fn compare(&self, a: &ReconciledRow, b: &ReconciledRow) -> Ordering {
        match self {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Position => position_rank(a.position).cmp(&position_rank(b.position)),
            SortColumn::TotalPoints => a.total_points.cmp(&b.total_points),
            SortColumn::Last5 => a.last_5.cmp(&b.last_5),
            SortColumn::Last3 => a.last_3.cmp(&b.last_3),
            SortColumn::LastGame => a.last_1.cmp(&b.last_1),
            SortColumn::Price => a.price.total_cmp(&b.price),
            SortColumn::PredictedPoints => a.predicted_points.total_cmp(&b.predicted_points),
            SortColumn::TotalExpectedPoints => {
                a.total_expected_points.total_cmp(&b.total_expected_points)
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown sort column {0:?}")]
pub struct ParseSortColumnError(String);

impl FromStr for SortColumn {
    type Err = ParseSortColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        SortColumn::ALL
            .into_iter()
            .find(|column| column.key() == key)
            .ok_or_else(|| ParseSortColumnError(s.to_string()))
    }
}

fn position_rank(position: Position) -> usize {
    Position::ALL
        .iter()
        .position(|p| *p == position)
        .unwrap_or(Position::ALL.len())
}

/// Stable sort, so equal keys keep their roster order
pub fn sort_rows(rows: &mut [ReconciledRow], column: SortColumn, descending: bool) {
    rows.sort_by(|a, b| {
        let ordering = column.compare(a, b);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Trimmed, distinct, non-empty names, capped at `MAX_COMPARE`
fn requested_names(names: &[String]) -> Vec<&str> {
    let mut wanted: Vec<&str> = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !wanted.contains(&name) {
            wanted.push(name);
        }
        if wanted.len() == MAX_COMPARE {
            break;
        }
    }
    wanted
}

/// Rows for up to `MAX_COMPARE` distinct player names, in the order asked for
pub fn compare_players(rows: &[ReconciledRow], names: &[String]) -> Vec<ReconciledRow> {
    requested_names(names)
        .iter()
        .flat_map(|name| rows.iter().filter(move |row| row.name == *name))
        .cloned()
        .collect()
}

/// Requested names that `compare_players` found no row for
pub fn missing_names(rows: &[ReconciledRow], names: &[String]) -> Vec<String> {
    requested_names(names)
        .into_iter()
        .filter(|name| !rows.iter().any(|row| row.name == *name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u32, name: &str, position: Position, total_points: i32, price: f64) -> ReconciledRow {
        ReconciledRow {
            id,
            name: name.to_string(),
            team: "ARS".to_string(),
            position,
            total_points,
            last_5: total_points / 4,
            last_3: total_points / 6,
            last_1: total_points / 20,
            price,
            predicted_points: price / 2.0,
            total_expected_points: (total_points / 4) as f64 + price / 2.0,
        }
    }

    fn rows() -> Vec<ReconciledRow> {
        vec![
            row(1, "Raya", Position::Goalkeeper, 80, 5.5),
            row(2, "Saka", Position::Midfielder, 150, 10.0),
            row(3, "Havertz", Position::Forward, 90, 8.0),
            row(4, "Gabriel", Position::Defender, 110, 6.0),
            row(5, "Rice", Position::Midfielder, 100, 6.5),
        ]
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        assert_eq!(RowFilter::default().apply(&rows()).len(), 5);
    }

    #[test]
    fn test_filter_by_price_points_and_position() {
        let filter = RowFilter {
            min_price: 6.0,
            min_points: 100,
            position: None,
        };
        let names: Vec<String> = filter.apply(&rows()).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Saka", "Gabriel", "Rice"]);

        let filter = RowFilter {
            position: Some(Position::Midfielder),
            ..RowFilter::default()
        };
        let names: Vec<String> = filter.apply(&rows()).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Saka", "Rice"]);
    }

    #[test]
    fn test_sort_rows() {
        let mut rows = rows();
        sort_rows(&mut rows, SortColumn::Price, true);
        assert_eq!(rows[0].name, "Saka");
        assert_eq!(rows[4].name, "Raya");

        sort_rows(&mut rows, SortColumn::Name, false);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Gabriel", "Havertz", "Raya", "Rice", "Saka"]);

        sort_rows(&mut rows, SortColumn::Position, false);
        assert_eq!(rows[0].position, Position::Goalkeeper);
        assert_eq!(rows[4].position, Position::Forward);
    }

    #[test]
    fn test_compare_players_limit_and_order() {
        let names: Vec<String> = ["Rice", "Saka", "Rice", "Nobody", "Raya", "Havertz", "Gabriel"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let compared = compare_players(&rows(), &names);
        let picked: Vec<&str> = compared.iter().map(|r| r.name.as_str()).collect();
        // Five distinct names asked for, "Nobody" has no row
        assert_eq!(picked, vec!["Rice", "Saka", "Raya", "Havertz"]);
    }

    #[test]
    fn test_sort_column_keys_round_trip_through_serde() {
        for column in SortColumn::ALL {
            let json = format!("\"{}\"", column.key());
            let parsed: SortColumn = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, column);
        }
    }

    #[test]
    fn test_missing_names_ignores_padding() {
        let names: Vec<String> = [" Saka", "Rice ", "Nobody", "  "]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let compared = compare_players(&rows(), &names);
        assert_eq!(compared.len(), 2);
        assert_eq!(missing_names(&rows(), &names), vec!["Nobody"]);
    }

    #[test]
    fn test_sort_column_from_str() {
        assert_eq!("price".parse::<SortColumn>().unwrap(), SortColumn::Price);
        assert_eq!(" last5 ".parse::<SortColumn>().unwrap(), SortColumn::Last5);
        assert!("".parse::<SortColumn>().is_err());
        assert!("Price".parse::<SortColumn>().is_err());
    }
}
