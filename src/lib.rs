// Library root: implied NAV tracking for closed-end funds

pub mod api;
pub mod config;
pub mod core;
pub mod market;
pub mod nav;
pub mod notify;
pub mod portfolio;
pub mod services;
pub mod tracker;
pub mod utils;

pub use crate::config::environment::EnvironmentVariables;
pub use crate::config::state::AppState;
pub use crate::core::server::create_app;
