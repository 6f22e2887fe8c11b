use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::warn;

const FPL_API_BASE_URL: &str = "https://fantasy.premierleague.com/api";
const PREDICTIONS_URL: &str = "https://fplform.com/fpl-predicted-points";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Upper bound for `HISTORY_CONCURRENCY`
pub const MAX_HISTORY_CONCURRENCY: usize = 64;
/// Upper bound for `PREDICTIONS_TTL_MINUTES` (one week)
pub const MAX_PREDICTIONS_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Runtime settings, read from the environment (and `.env` via the binaries)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub fpl_api_base_url: String,
    pub predictions_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Max player-history requests in flight during one batch
    pub history_concurrency: usize,
    /// 0 disables memoizing predictions between batches
    pub predictions_ttl_minutes: i64,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fpl_api_base_url: FPL_API_BASE_URL.to_string(),
            predictions_url: PREDICTIONS_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout_secs: 30,
            history_concurrency: 8,
            predictions_ttl_minutes: 0,
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("FPL_API_BASE_URL") {
            config.fpl_api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = env::var("PREDICTIONS_URL") {
            config.predictions_url = url;
        }
        if let Ok(user_agent) = env::var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = parse_var("HTTP_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout;
        }
        if let Some(concurrency) =
            parse_var_in("HISTORY_CONCURRENCY", 1..=MAX_HISTORY_CONCURRENCY)
        {
            config.history_concurrency = concurrency;
        }
        if let Some(ttl) =
            parse_var_in("PREDICTIONS_TTL_MINUTES", 0..=MAX_PREDICTIONS_TTL_MINUTES)
        {
            config.predictions_ttl_minutes = ttl;
        }
        if let Ok(addr) = env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }

        config
    }
}

/// Read and parse a variable; unparseable values keep the default
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring invalid value, using default");
            None
        }
    }
}

/// Like `parse_var`, but values outside `range` also keep the default
fn parse_var_in<T>(name: &str, range: RangeInclusive<T>) -> Option<T>
where
    T: FromStr + PartialOrd + Display,
{
    let value = parse_var(name)?;
    if range.contains(&value) {
        Some(value)
    } else {
        warn!(
            variable = name,
            value = %value,
            min = %range.start(),
            max = %range.end(),
            "ignoring out-of-range value, using default"
        );
        None
    }
}
