use crate::models::ReconciledRow;
use serde::Serialize;

/// One bar of a horizontal bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
    /// Bar length as a percentage of the widest bar, 0-100
    pub width_pct: f64,
}

/// Scale a metric across rows. Zero and negative values get an empty bar.
pub fn bar_chart<F>(rows: &[ReconciledRow], metric: F) -> Vec<ChartBar>
where
    F: Fn(&ReconciledRow) -> f64,
{
    let values: Vec<f64> = rows.iter().map(&metric).collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max);

    rows.iter()
        .zip(values)
        .map(|(row, value)| ChartBar {
            label: row.name.clone(),
            value,
            width_pct: if max > 0.0 {
                (value.max(0.0) / max * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            },
        })
        .collect()
}
