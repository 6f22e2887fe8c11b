use crate::models::GameweekResult;
use serde::{Deserialize, Serialize};

/// Recent-form totals for one player. `Default` is the all-zero summary used
/// when a player has no history or it could not be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsSummary {
    pub last_5: i32,
    pub last_3: i32,
    pub last_1: i32,
}

impl PointsSummary {
    /// Sum the most recent 1, 3 and 5 rounds. Short histories sum whatever
    /// is there; the input order does not matter.
    pub fn from_history(history: &[GameweekResult]) -> Self {
        let mut recent: Vec<&GameweekResult> = history.iter().collect();
        recent.sort_by(|a, b| b.round.cmp(&a.round));

        let sum_last = |n: usize| -> i32 { recent.iter().take(n).map(|r| r.total_points).sum() };

        Self {
            last_5: sum_last(5),
            last_3: sum_last(3),
            last_1: sum_last(1),
        }
    }
}
