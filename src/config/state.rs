// Application state shared by every handler

use std::sync::Arc;
use crate::config::environment::EnvironmentVariables;
use crate::services::NavService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub environment: Arc<EnvironmentVariables>,
    pub nav: Arc<NavService>,
}

impl AppState {
    /// Builds the state around an explicit configuration
    pub fn new(environment: Arc<EnvironmentVariables>) -> anyhow::Result<Self> {
        let nav: NavService = NavService::new(environment.clone())?;

        Ok(Self {
            environment,
            nav: Arc::new(nav),
        })
    }

    /// Builds the state from the process-wide environment singleton
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(Arc::new(EnvironmentVariables::instance()?.clone()))
    }
}
