pub mod reference;
pub mod worker;

pub use reference::{market_date, ReferenceState};
pub use worker::Tracker;
