// Threshold alerts on implied NAV moves and the Telegram message texts

use std::collections::HashMap;

use super::dashboard::{Dashboard, FundSnapshot};

const WARNING_THRESHOLD: f64 = 0.5;
const CRITICAL_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AlertLevel {
    #[default]
    None = 0,
    Warning = 1,
    Critical = 2,
}

impl AlertLevel {
    pub fn for_move(implied_move: f64) -> Self {
        let magnitude = implied_move.abs();
        if magnitude >= CRITICAL_THRESHOLD {
            AlertLevel::Critical
        } else if magnitude >= WARNING_THRESHOLD {
            AlertLevel::Warning
        } else {
            AlertLevel::None
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            AlertLevel::None => "",
            AlertLevel::Warning => "⚠️",
            AlertLevel::Critical => "🚨🚨",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub fund: String,
    pub level: AlertLevel,
    pub message: String,
}

/// Highest level already alerted per fund. Levels only escalate until `reset`.
#[derive(Debug, Default)]
pub struct AlertBook {
    levels: HashMap<String, AlertLevel>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts every listed fund at `AlertLevel::None`
    pub fn with_funds<'a>(funds: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            levels: funds
                .into_iter()
                .map(|name| (name.to_string(), AlertLevel::None))
                .collect(),
        }
    }

    pub fn level(&self, fund: &str) -> AlertLevel {
        self.levels.get(fund).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.levels.values_mut().for_each(|l| *l = AlertLevel::None);
    }

    /// Returns an alert when the fund crossed into a higher level than previously alerted
    pub fn evaluate(&mut self, fund: &FundSnapshot) -> Option<Alert> {
        let level = AlertLevel::for_move(fund.raw_move);
        let last = self.level(&fund.name);

        if level <= last {
            return None;
        }

        self.levels.insert(fund.name.clone(), level);

        Some(Alert {
            fund: fund.name.clone(),
            level,
            message: alert_message(level, fund),
        })
    }

    pub fn evaluate_all(&mut self, dashboard: &Dashboard) -> Vec<Alert> {
        dashboard
            .cefs
            .iter()
            .filter_map(|fund| self.evaluate(fund))
            .collect()
    }
}

fn alert_message(level: AlertLevel, fund: &FundSnapshot) -> String {
    let direction = if fund.raw_move > 0.0 { "UP" } else { "DOWN" };

    format!(
        "{} {} NAV Alert\nImplied NAV: {} {:+.2}%\nDriven by {:.1}% reported holdings.",
        level.emoji(),
        fund.name,
        direction,
        fund.raw_move,
        fund.raw_tracked_weight,
    )
}

/// On-demand summary of every fund's implied move
pub fn manual_summary(dashboard: &Dashboard) -> String {
    let mut lines: Vec<String> = vec![
        "📊 *Manual NAV Update*".to_string(),
        format!("_{}_", dashboard.last_updated),
        String::new(),
    ];

    for fund in &dashboard.cefs {
        let icon = if fund.implied_move > 0.0 {
            "🟢"
        } else if fund.implied_move < 0.0 {
            "🔴"
        } else {
            "➖"
        };
        lines.push(format!("{} *{}*: {:+.3}%", icon, fund.name, fund.implied_move));
    }

    lines.join("\n")
}
