use crate::models::ReconciledRow;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write rows as CSV with the dashboard's column headers
pub fn write_rows_csv<W: Write>(rows: &[ReconciledRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row for {}", row.name))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Save rows to a CSV file
pub fn save_rows_to_csv(rows: &[ReconciledRow], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    write_rows_csv(rows, file)
}
