// Daily reference state persisted between tracker restarts

use std::{collections::HashMap, path::Path};

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::market::PriceBook;
use crate::utils::json_files::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceState {
    #[serde(default)]
    pub date: String,
    /// First price observed per symbol on `date`
    #[serde(default)]
    pub prices: HashMap<String, f64>,
}

impl ReferenceState {
    pub fn for_day(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            prices: HashMap::new(),
        }
    }

    /// Missing or unreadable files fall back to an empty reference
    pub async fn load(path: &Path) -> Self {
        match read_json::<ReferenceState>(path).await {
            Ok(Some(state)) => state,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Ignoring reference file: {:#}", e);
                Self::default()
            }
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self).await
    }

    /// Records prices not yet seen today. Returns true if anything was added.
    pub fn record_prices(&mut self, book: &PriceBook) -> bool {
        let mut added = false;

        for (symbol, quote) in book {
            if let Some(price) = quote.price {
                if !self.prices.contains_key(symbol) {
                    self.prices.insert(symbol.clone(), price);
                    added = true;
                }
            }
        }

        added
    }
}

/// Calendar date (`YYYY-MM-DD`) at the given UTC offset
pub fn market_date(now: DateTime<Utc>, utc_offset_hours: i32) -> String {
    // ? Out of range offsets fall back to UTC
    let offset: FixedOffset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix());

    now.with_timezone(&offset).format("%Y-%m-%d").to_string()
}
