pub mod alerts;
pub mod dashboard;

pub use alerts::{manual_summary, Alert, AlertBook, AlertLevel};
pub use dashboard::{local_clock, Dashboard, Direction, FundSnapshot, HoldingSnapshot};
