pub mod holdings;

pub use holdings::{Fund, Holding, Holdings};
