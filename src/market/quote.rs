use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const YAHOO_SOURCE: &str = "YAHOO";

/// Daily move of one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Last close. Absent for quotes restored from a saved dashboard.
    pub price: Option<f64>,
    pub change_percent: f64,
    pub source: String,
}

impl Quote {
    /// Builds a quote from the last two closes, `None` unless the previous close is positive
    pub fn from_closes(last: f64, prev: f64, source: &str) -> Option<Self> {
        if prev <= 0.0 || !last.is_finite() || !prev.is_finite() {
            return None;
        }

        Some(Self {
            price: Some(last),
            change_percent: (last - prev) / prev * 100.0,
            source: source.to_string(),
        })
    }
}

pub type PriceBook = HashMap<String, Quote>;
