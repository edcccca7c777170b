// Polling worker: refreshes quotes on an interval and exports the dashboard file

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use super::reference::{market_date, ReferenceState};
use crate::config::environment::EnvironmentVariables;
use crate::market::{PriceBook, YahooClient};
use crate::nav::{AlertBook, Dashboard};
use crate::notify::TelegramNotifier;
use crate::portfolio::Holdings;
use crate::services::dispatch_alerts;
use crate::utils::json_files::{read_json, write_json_atomic};

pub struct Tracker {
    environment: Arc<EnvironmentVariables>,
    holdings: Holdings,
    symbols: Vec<String>,
    yahoo: YahooClient,
    notifier: TelegramNotifier,
    alerts: AlertBook,
    reference: ReferenceState,
    prices: PriceBook,
}

impl Tracker {
    /// Loads holdings, the daily reference and the last exported dashboard, then exports once
    pub async fn start(environment: Arc<EnvironmentVariables>) -> Result<Self> {
        let holdings_file = &environment.holdings_file;
        let exists: bool = tokio::fs::try_exists(holdings_file)
            .await
            .with_context(|| format!("Cannot access {}", holdings_file.display()))?;
        if !exists {
            bail!("Holdings file not found: {}", holdings_file.display());
        }

        let holdings = Holdings::load(holdings_file).await;
        if holdings.is_empty() {
            bail!("Holdings file {} has no funds", holdings_file.display());
        }

        let yahoo = YahooClient::new(
            environment.yahoo_base_url.to_string(),
            environment.yahoo_concurrency,
        )?;
        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            environment.telegram_api_url.to_string(),
            environment.telegram_bot_token.clone(),
            environment.telegram_chat_id.clone(),
        );

        let reference = ReferenceState::load(&environment.reference_file).await;
        let prices = restore_prices(&environment).await;

        let mut tracker = Self {
            symbols: holdings.trackable_symbols(),
            alerts: AlertBook::with_funds(holdings.fund_names()),
            holdings,
            yahoo,
            notifier,
            reference,
            prices,
            environment,
        };

        tracker.export().await?;
        Ok(tracker)
    }

    pub fn prices(&self) -> &PriceBook {
        &self.prices
    }

    pub fn reference(&self) -> &ReferenceState {
        &self.reference
    }

    /// Clears the day's baselines, prices and alert levels when the market date changed
    pub async fn roll_day(&mut self, today: &str) -> Result<bool> {
        if self.reference.date == today {
            return Ok(false);
        }

        info!(">>> NEW DAY DETECTED ({}) - RESETTING BASELINES <<<", today);
        self.reference = ReferenceState::for_day(today);
        self.prices.clear();
        self.alerts.reset();
        self.reference.save(&self.environment.reference_file).await?;

        Ok(true)
    }

    /// One polling cycle for the given market date
    #[instrument(skip(self))]
    pub async fn cycle_at(&mut self, today: &str) -> Result<()> {
        self.roll_day(today).await?;

        let snapshot: PriceBook = self.yahoo.fetch_snapshot(&self.symbols).await;
        if snapshot.is_empty() {
            warn!("Yahoo: no data returned, keeping old values");
            return Ok(());
        }

        info!("Yahoo: received {} updates", snapshot.len());

        if self.reference.record_prices(&snapshot) {
            self.reference.save(&self.environment.reference_file).await?;
        }
        self.prices.extend(snapshot);

        self.export().await
    }

    pub async fn cycle(&mut self) -> Result<()> {
        let today = market_date(Utc::now(), self.environment.market_utc_offset_hours);
        self.cycle_at(&today).await
    }

    /// Runs cycles until `shutdown` resolves. Cycle errors are logged and the loop continues.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let interval = Duration::from_secs(self.environment.poll_interval_seconds);
        tokio::pin!(shutdown);

        loop {
            if let Err(e) = self.cycle().await {
                error!("Tracker cycle failed: {:#}", e);
            }

            info!("Cycle complete. Waiting {}s...", interval.as_secs());

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    info!("Tracker stopped");
                    break;
                }
            }
        }
    }

    async fn export(&mut self) -> Result<()> {
        let dashboard = Dashboard::build_now(&self.holdings, &self.prices);

        let alerts = self.alerts.evaluate_all(&dashboard);
        dispatch_alerts(&self.notifier, &alerts).await;

        write_json_atomic(&self.environment.dashboard_file, &dashboard).await
    }
}

async fn restore_prices(environment: &EnvironmentVariables) -> PriceBook {
    match read_json::<Dashboard>(&environment.dashboard_file).await {
        Ok(Some(dashboard)) => {
            info!("Restored {} symbols from previous state", dashboard.quoted_rows());
            dashboard.restore_price_book()
        }
        Ok(None) => PriceBook::new(),
        Err(e) => {
            warn!("Failed to restore state: {:#}", e);
            PriceBook::new()
        }
    }
}
