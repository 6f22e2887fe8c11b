use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fpl_stats::data::save_rows_to_csv;
use fpl_stats::filters::{
    compare_players, missing_names, sort_rows, RowFilter, SortColumn, MAX_COMPARE,
};
use fpl_stats::{parse_team_id, Config, Position, ReconciledRow, StatsService};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fpl-stats", about = "Fantasy Premier League form and predicted points")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// All players with form and predicted points
    Players {
        #[arg(long, default_value_t = 0.0)]
        min_price: f64,
        #[arg(long, default_value_t = 0)]
        min_points: i32,
        /// goalkeeper, defender, midfielder or forward
        #[arg(long)]
        position: Option<Position>,
        #[arg(long, value_enum, default_value_t = SortColumn::TotalExpectedPoints)]
        sort: SortColumn,
        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,
        #[arg(long)]
        limit: Option<usize>,
        /// Also write the rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Players in a manager's squad for the current gameweek
    Team {
        #[arg(value_parser = parse_team_id)]
        team_id: u64,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Compare up to five players by display name
    Compare {
        #[arg(required = true, num_args = 1..=MAX_COMPARE)]
        names: Vec<String>,
    },
}

fn print_rows(title: &str, rows: &[ReconciledRow]) {
    println!("{}\n", title);
    if rows.is_empty() {
        println!("No players found.");
        return;
    }
    for (i, row) in rows.iter().enumerate() {
        println!("{:>3}. {}", i + 1, row.format());
    }
}

fn maybe_save_csv(rows: &[ReconciledRow], csv: Option<PathBuf>) -> Result<()> {
    if let Some(path) = csv {
        save_rows_to_csv(rows, &path)?;
        println!("\nSaved {} rows to {}", rows.len(), path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let service = StatsService::new(Config::from_env()).context("Failed to set up clients")?;

    println!("Fantasy Premier League Statistics\n");

    match cli.command {
        Command::Players {
            min_price,
            min_points,
            position,
            sort,
            ascending,
            limit,
            csv,
        } => {
            let rows = service
                .players_with_points()
                .await
                .context("Failed to load player data")?;

            let filter = RowFilter {
                min_price,
                min_points,
                position,
            };
            let mut rows = filter.apply(&rows);
            sort_rows(&mut rows, sort, !ascending);
            if let Some(limit) = limit {
                rows.truncate(limit);
            }

            print_rows(&format!("ALL PLAYERS (sorted by {})", sort.label()), &rows);
            maybe_save_csv(&rows, csv)?;
        }
        Command::Team { team_id, csv } => {
            let rows = service
                .team_players(team_id)
                .await
                .with_context(|| format!("Failed to load team {}", team_id))?;

            print_rows(&format!("TEAM {}", team_id), &rows);
            maybe_save_csv(&rows, csv)?;
        }
        Command::Compare { names } => {
            let rows = service
                .players_with_points()
                .await
                .context("Failed to load player data")?;

            let compared = compare_players(&rows, &names);
            print_rows("PLAYER COMPARISON", &compared);

            let missing = missing_names(&compared, &names);
            if !missing.is_empty() {
                println!("\nNo player found for: {:?}", missing);
            }
        }
    }

    Ok(())
}
