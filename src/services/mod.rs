pub mod nav_service;

pub use nav_service::{dispatch_alerts, NavError, NavService, SummaryOutcome};
