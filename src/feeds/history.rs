use crate::config::AppConfig;
use crate::errors::{SimError, SimResult};
use crate::series::{PriceBar, PriceSeries};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;

/// The history endpoint serves at most this many daily bars per request.
const MAX_RANGE_DAYS: i64 = 2000;

/// Backoff ceiling between retry attempts.
const MAX_BACKOFF_SECS: u64 = 30;

/// Transient failures are retried by `fetch_daily_history`; fatal ones
/// propagate immediately as the caller-facing error. The core never sees
/// this distinction -- by the time an error leaves this module it is final.
enum FetchError {
    Fatal(SimError),
    Transient(String),
}

/// Download the daily BTC history quoted in `quote` between `start` and
/// `end` (inclusive). Transient failures (HTTP errors, timeouts, malformed
/// payloads) are retried with exponential backoff up to the configured cap;
/// connectivity failures and retry exhaustion fail with
/// `DataSourceUnavailable`.
pub async fn fetch_daily_history(
    client: &Client,
    config: &AppConfig,
    quote: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> SimResult<PriceSeries> {
    let mut attempt: u32 = 0;
    loop {
        match fetch_once(client, config, quote, start, end).await {
            Ok(series) => return Ok(series),
            Err(FetchError::Fatal(e)) => return Err(e),
            Err(FetchError::Transient(msg)) => {
                attempt += 1;
                if attempt >= config.feed_max_retries {
                    return Err(SimError::DataSourceUnavailable(format!(
                        "giving up after {attempt} attempts: {msg}"
                    )));
                }
                let backoff = std::cmp::min(1u64 << attempt.min(6), MAX_BACKOFF_SECS);
                tracing::warn!(
                    error = %msg,
                    attempt,
                    backoff_secs = backoff,
                    "history fetch failed, retrying"
                );
                tokio::time::sleep(std::time::Duration::from_secs(backoff)).await;
            }
        }
    }
}

// Actual histoday response format:
// {
//   "Response": "Success",
//   "Data": {
//     "Data": [
//       {
//         "time": 1420070400,
//         "open": 963.38,
//         "close": 995.44,
//         "high": 1001.1,
//         "low": 960.2
//       }
//     ]
//   }
// }

#[derive(serde::Deserialize)]
struct HistoryResponse {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
    #[serde(rename = "Data")]
    data: Option<HistoryData>,
}

#[derive(serde::Deserialize)]
struct HistoryData {
    #[serde(rename = "Data")]
    bars: Option<Vec<DailyBar>>,
}

#[derive(serde::Deserialize)]
struct DailyBar {
    time: Option<i64>,
    open: Option<f64>,
    close: Option<f64>,
}

async fn fetch_once(
    client: &Client,
    config: &AppConfig,
    quote: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, FetchError> {
    let range_days = (end - start).num_days();
    if range_days > MAX_RANGE_DAYS {
        return Err(FetchError::Fatal(SimError::InvalidParameter(format!(
            "date range too large: {range_days} days (max {MAX_RANGE_DAYS})"
        ))));
    }

    let (start_ts, end_ts) = range_timestamps(start, end).map_err(FetchError::Fatal)?;
    let url = format!(
        "{}/v2/histoday",
        config.api_base_url.trim_end_matches('/')
    );

    let to_ts = end_ts.to_string();
    let limit = range_days.to_string();
    let mut request = client.get(&url).query(&[
        ("fsym", "BTC"),
        ("tsym", quote),
        ("toTs", to_ts.as_str()),
        ("limit", limit.as_str()),
    ]);
    if let Some(key) = &config.api_key {
        request = request.header("authorization", format!("Apikey {key}"));
    }

    let resp = request.send().await.map_err(|e| {
        if e.is_connect() {
            // No route to the data source. Matches the permanent-failure
            // contract: propagate, do not retry.
            FetchError::Fatal(SimError::DataSourceUnavailable(format!(
                "connectivity failure: {e}"
            )))
        } else {
            FetchError::Transient(format!("request failed: {e}"))
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Transient(format!("HTTP {status}: {body}")));
    }

    let payload: HistoryResponse = resp
        .json()
        .await
        .map_err(|e| FetchError::Transient(format!("parse: {e}")))?;

    if payload.response.as_deref() == Some("Error") {
        return Err(FetchError::Fatal(SimError::DataSourceUnavailable(format!(
            "API rejected request: {}",
            payload.message.unwrap_or_else(|| "no message".into())
        ))));
    }

    let bars = payload
        .data
        .and_then(|d| d.bars)
        .ok_or_else(|| FetchError::Transient("no bar data in response".into()))?;

    bars_to_series(bars, start_ts, end_ts)
}

/// Convert wire bars to the validated series. Bars outside the requested
/// range are dropped, as are the zero-price placeholder bars the endpoint
/// pads ranges with before the asset's first listing.
fn bars_to_series(
    bars: Vec<DailyBar>,
    start_ts: i64,
    end_ts: i64,
) -> Result<PriceSeries, FetchError> {
    let total = bars.len();
    let kept: Vec<PriceBar> = bars
        .into_iter()
        .filter_map(|b| {
            let time = b.time?;
            let open = b.open?;
            let close = b.close?;
            if time < start_ts || time > end_ts || open <= 0.0 || close <= 0.0 {
                return None;
            }
            let timestamp = DateTime::<Utc>::from_timestamp(time, 0)?;
            Some(PriceBar {
                timestamp,
                open,
                close,
            })
        })
        .collect();

    if kept.len() < total {
        tracing::debug!(
            dropped = total - kept.len(),
            kept = kept.len(),
            "dropped out-of-range or empty bars"
        );
    }
    if kept.is_empty() {
        return Err(FetchError::Fatal(SimError::DataSourceUnavailable(
            "no usable bars for the requested range".into(),
        )));
    }

    PriceSeries::new(kept).map_err(FetchError::Fatal)
}

fn range_timestamps(start: NaiveDate, end: NaiveDate) -> Result<(i64, i64), SimError> {
    let to_ts = |d: NaiveDate| {
        d.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| SimError::Input(format!("invalid date: {d}")))
    };
    Ok((to_ts(start)?, to_ts(end)?))
}
