use crate::config::Config;
use crate::models::Predictions;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Columns a data row must have for the prediction column to exist
const MIN_CELLS: usize = 10;
const NAME_CELL: usize = 1;
const POINTS_CELL: usize = 9;

pub struct PredictedPointsScraper {
    url: String,
    client: reqwest::Client,
}

impl PredictedPointsScraper {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(REFERER, HeaderValue::from_static("https://fplform.com/"));

        Ok(Self {
            url: config.predictions_url.clone(),
            client: reqwest::Client::builder()
                .user_agent(config.user_agent.as_str())
                .default_headers(headers)
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()?,
        })
    }

    /// Fetch and parse predicted points. An unreachable or unparseable page
    /// yields an empty map, meaning "no predictions available".
    pub async fn fetch_predictions(&self) -> Predictions {
        info!(url = %self.url, "fetching predicted points");

        let html = match self.fetch_page().await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "failed to fetch predicted points page");
                return Predictions::new();
            }
        };

        let predictions = parse_predictions(&html);
        if predictions.is_empty() {
            warn!("no predictions were found on the page");
        } else {
            info!(count = predictions.len(), "parsed predicted points");
        }
        predictions
    }

    async fn fetch_page(&self) -> Result<String, reqwest::Error> {
        self.client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

/// Parse the first table of the page into name -> predicted points.
///
/// The first row is treated as the header. Rows with fewer than ten `<td>`
/// cells, an empty name, or a points cell without a positive number are
/// skipped. A repeated name keeps the last value seen.
pub fn parse_predictions(html: &str) -> Predictions {
    let mut predictions = Predictions::new();

    let (Ok(table_selector), Ok(row_selector), Ok(cell_selector)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("td"),
    ) else {
        return predictions;
    };

    let document = Html::parse_document(html);
    let Some(table) = document.select(&table_selector).next() else {
        debug!("no tables found on the page");
        return predictions;
    };

    for (index, row) in table.select(&row_selector).enumerate().skip(1) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        match parse_row(&cells) {
            Some((name, points)) => {
                predictions.insert(name, points);
            }
            None => debug!(row = index, cells = cells.len(), "skipping prediction row"),
        }
    }

    predictions
}

fn parse_row(cells: &[ElementRef]) -> Option<(String, f64)> {
    if cells.len() < MIN_CELLS {
        return None;
    }

    let name = cell_text(cells.get(NAME_CELL)?);
    if name.is_empty() {
        return None;
    }

    let points = parse_points(&cell_text(cells.get(POINTS_CELL)?))?;
    Some((name, points))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Strip decoration like "£" or "pts" and parse what is left.
/// Only positive values count; zero and below are parsing noise.
pub fn parse_points(text: &str) -> Option<f64> {
    let numeric: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !numeric.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = numeric.parse::<f64>().ok()?;
    (value > 0.0).then_some(value)
}
