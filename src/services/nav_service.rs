// NAV service: builds dashboards on demand, caches them and raises alerts

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

use crate::config::environment::EnvironmentVariables;
use crate::market::YahooClient;
use crate::nav::{manual_summary, Alert, AlertBook, Dashboard};
use crate::notify::{NotifyError, TelegramNotifier};
use crate::portfolio::Holdings;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("Holdings not found")]
    HoldingsNotFound,
}

#[derive(Debug, Clone)]
struct CachedDashboard {
    refreshed_at: Instant,
    dashboard: Dashboard,
}

/// Outcome of a manual summary push
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SummaryOutcome {
    pub success: bool,
    pub message: String,
}

impl SummaryOutcome {
    fn new(success: bool, message: impl Into<String>) -> Self {
        Self { success, message: message.into() }
    }
}

#[derive(Debug)]
pub struct NavService {
    environment: Arc<EnvironmentVariables>,
    yahoo: YahooClient,
    notifier: TelegramNotifier,
    alerts: Mutex<AlertBook>,
    cache: RwLock<Option<CachedDashboard>>,
}

impl NavService {
    pub fn new(environment: Arc<EnvironmentVariables>) -> Result<Self> {
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

        Ok(Self {
            environment,
            yahoo,
            notifier,
            alerts: Mutex::new(AlertBook::new()),
            cache: RwLock::new(None),
        })
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.environment.cache_duration_seconds)
    }

    /// Fetches fresh quotes, builds the dashboard and sends any alert escalations
    #[instrument(skip(self))]
    pub async fn generate(&self) -> Result<Dashboard, NavError> {
        let holdings = Holdings::load(&self.environment.holdings_file).await;
        if holdings.is_empty() {
            return Err(NavError::HoldingsNotFound);
        }

        let prices = self.yahoo.fetch_snapshot(&holdings.trackable_symbols()).await;
        let dashboard = Dashboard::build_now(&holdings, &prices);

        let alerts: Vec<Alert> = self.alerts.lock().await.evaluate_all(&dashboard);
        if !alerts.is_empty() {
            // ! Levels are already recorded; the sends must outlive a timed out request
            let notifier = self.notifier.clone();
            let delivery = tokio::spawn(async move { dispatch_alerts(&notifier, &alerts).await });
            if let Err(e) = delivery.await {
                warn!("Alert delivery task failed: {}", e);
            }
        }

        Ok(dashboard)
    }

    /// Serves the cached dashboard while fresh, regenerating it otherwise
    pub async fn dashboard(&self) -> Result<Dashboard, NavError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.refreshed_at.elapsed() < self.cache_ttl() {
                return Ok(cached.dashboard.clone());
            }
        }

        self.refresh().await
    }

    /// Forces a regeneration and caches the result on success
    pub async fn refresh(&self) -> Result<Dashboard, NavError> {
        let started = Instant::now();
        let dashboard = self.generate().await?;

        *self.cache.write().await = Some(CachedDashboard {
            refreshed_at: started,
            dashboard: dashboard.clone(),
        });

        Ok(dashboard)
    }

    /// Any dashboard already built, ignoring its age
    async fn latest(&self) -> Option<Dashboard> {
        self.cache.read().await.as_ref().map(|c| c.dashboard.clone())
    }

    /// Pushes the manual summary of the latest dashboard to Telegram
    #[instrument(skip(self))]
    pub async fn send_summary(&self) -> SummaryOutcome {
        let dashboard = match self.latest().await {
            Some(dashboard) => dashboard,
            None => match self.generate().await {
                Ok(dashboard) => dashboard,
                Err(e) => {
                    warn!("Summary skipped: {}", e);
                    return SummaryOutcome::new(false, "No data available");
                }
            },
        };

        match self.notifier.send_message(&manual_summary(&dashboard)).await {
            Ok(()) => SummaryOutcome::new(true, "Notification sent!"),
            Err(e) => {
                warn!("Manual summary failed: {}", e);
                SummaryOutcome::new(false, "Failed to send")
            }
        }
    }
}

/// Sends alerts one by one. Failures are logged and never abort the caller.
pub async fn dispatch_alerts(notifier: &TelegramNotifier, alerts: &[Alert]) {
    for alert in alerts {
        info!("ALERT TRIGGERED: {} ({:?})", alert.fund, alert.level);

        match notifier.send_message(&alert.message).await {
            Ok(()) => {}
            Err(NotifyError::NotConfigured) => {
                warn!("Telegram keys missing, alert for {} logged only", alert.fund)
            }
            Err(e) => warn!("Alert for {} not delivered: {}", alert.fund, e),
        }
    }
}
