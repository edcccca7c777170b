//! Yahoo Finance chart client.
//!
//! Pulls five sessions of daily closes per symbol and derives the latest
//! session's change against the previous close. Weekends and holidays are
//! covered by the five day window.
//!
//! API: {base}/v8/finance/chart/{symbol}?range=5d&interval=1d

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use super::quote::{PriceBook, Quote, YAHOO_SOURCE};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; cef-nav/0.1)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo chart API client
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
    concurrency: usize,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, concurrency: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build Yahoo HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            concurrency: concurrency.max(1),
        })
    }

    /// Fetch a snapshot for every symbol. Symbols that fail or lack two closes are left out.
    pub async fn fetch_snapshot(&self, symbols: &[String]) -> PriceBook {
        let mut book = PriceBook::new();
        if symbols.is_empty() {
            return book;
        }

        info!("Fetching Yahoo batch for {} tickers", symbols.len());

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(String, Result<Option<Quote>>)> = JoinSet::new();

        for symbol in symbols {
            let this = self.clone();
            let symbol = symbol.clone();
            let permits = permits.clone();

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let quote = this.fetch_quote(&symbol).await;
                (symbol, quote)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((symbol, Ok(Some(quote)))) => {
                    book.insert(symbol, quote);
                }
                Ok((symbol, Ok(None))) => debug!("Yahoo: not enough history for {}", symbol),
                Ok((symbol, Err(e))) => warn!("Yahoo: {} failed: {:#}", symbol, e),
                Err(e) => warn!("Yahoo: quote task aborted: {}", e),
            }
        }

        info!("Yahoo: received {} of {} quotes", book.len(), symbols.len());
        book
    }

    /// `{base}/v8/finance/chart/{symbol}` with the symbol as one encoded path segment
    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Yahoo base URL: {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("Yahoo base URL cannot hold a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);

        Ok(url)
    }

    /// Fetch one symbol's quote
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let url = self.chart_url(symbol)?;

        let response = self
            .client
            .get(url)
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await
            .context("Yahoo request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Yahoo API error: {}", response.status()));
        }

        let body: ChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo chart response")?;

        if let Some(err) = body.chart.error {
            return Err(anyhow!("Yahoo chart error {}: {}", err.code, err.description));
        }

        let closes: Vec<f64> = body
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|r| r.indicators.quote.into_iter().next())
            .map(|q| q.close.into_iter().flatten().collect())
            .unwrap_or_default();

        Ok(quote_from_closes(&closes))
    }
}

/// Derives a quote from a daily close series with gaps already removed
fn quote_from_closes(closes: &[f64]) -> Option<Quote> {
    match closes {
        [.., prev, last] => Quote::from_closes(*last, *prev, YAHOO_SOURCE),
        _ => None,
    }
}
