// Implied NAV calculation and the dashboard document served to clients

use serde::{Deserialize, Serialize};

use crate::market::{PriceBook, Quote};
use crate::portfolio::{Fund, Holdings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Flat counts as up, matching the dashboard colouring
    pub fn of(change: f64) -> Self {
        if change >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSnapshot {
    pub symbol: String,
    pub weight: f64,
    pub change: Option<f64>,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundSnapshot {
    pub name: String,
    pub implied_move: f64,
    pub tracked_weight: f64,
    pub status: Direction,
    pub holdings: Vec<HoldingSnapshot>,
    // * Unrounded totals, used for alerting only
    #[serde(skip)]
    pub raw_move: f64,
    #[serde(skip)]
    pub raw_tracked_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub last_updated: String,
    pub cefs: Vec<FundSnapshot>,
}

impl FundSnapshot {
    pub fn compute(fund: &Fund, prices: &PriceBook) -> Self {
        let mut total_move = 0.0_f64;
        let mut tracked_weight = 0.0_f64;
        let mut holdings = Vec::with_capacity(fund.holdings.len());

        for holding in &fund.holdings {
            let quote: Option<&Quote> = prices.get(&holding.symbol);
            let change: Option<f64> = quote.map(|q| q.change_percent);

            // ? Unquoted holdings contribute nothing but still count toward the fund's weight
            total_move += change.unwrap_or(0.0) * holding.weight / 100.0;
            if change.is_some() {
                tracked_weight += holding.weight;
            }

            holdings.push(HoldingSnapshot {
                symbol: holding.symbol.clone(),
                weight: holding.weight,
                change,
                source: quote.map(|q| q.source.clone()).unwrap_or_default(),
            });
        }

        Self {
            name: fund.name.clone(),
            implied_move: round_to(total_move, 3),
            tracked_weight: round_to(tracked_weight, 1),
            status: Direction::of(total_move),
            holdings,
            raw_move: total_move,
            raw_tracked_weight: tracked_weight,
        }
    }
}

impl Dashboard {
    pub fn build(holdings: &Holdings, prices: &PriceBook, last_updated: impl Into<String>) -> Self {
        Self {
            last_updated: last_updated.into(),
            cefs: holdings
                .funds()
                .iter()
                .map(|fund| FundSnapshot::compute(fund, prices))
                .collect(),
        }
    }

    /// Builds a dashboard stamped with the local wall clock
    pub fn build_now(holdings: &Holdings, prices: &PriceBook) -> Self {
        Self::build(holdings, prices, local_clock())
    }

    /// Holding rows that carry a change, counted per fund
    pub fn quoted_rows(&self) -> usize {
        self.cefs
            .iter()
            .flat_map(|fund| fund.holdings.iter())
            .filter(|h| h.change.is_some())
            .count()
    }

    /// Recovers the last known changes from a saved dashboard. Prices are not stored there.
    pub fn restore_price_book(&self) -> PriceBook {
        self.cefs
            .iter()
            .flat_map(|fund| fund.holdings.iter())
            .filter_map(|h| {
                h.change.map(|change| {
                    (
                        h.symbol.clone(),
                        Quote {
                            price: None,
                            change_percent: change,
                            source: h.source.clone(),
                        },
                    )
                })
            })
            .collect()
    }
}

/// Local time as `HH:MM:SS`
pub fn local_clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
