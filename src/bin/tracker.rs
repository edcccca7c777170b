// Background tracker: polls quotes and keeps the dashboard file current

use std::sync::Arc;

use cef_nav::config::environment::EnvironmentVariables;
use cef_nav::core::{logging, server};
use cef_nav::tracker::Tracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let environment: Arc<EnvironmentVariables> = Arc::new(EnvironmentVariables::instance()?.clone());
    tracing::info!(
        "Tracking {} every {}s",
        environment.holdings_file.display(),
        environment.poll_interval_seconds
    );

    let tracker: Tracker = Tracker::start(environment).await?;
    tracker.run(server::shutdown_signal()).await;

    Ok(())
}
