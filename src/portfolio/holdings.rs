// Fund holdings as published by each CEF: symbol plus portfolio weight in percent

use std::{collections::BTreeSet, fmt, path::Path};

use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use tracing::warn;

/// Marker for private positions that have no market quote
const PRIVATE_MARKER: &str = "_PVT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub weight: f64,
}

impl Holding {
    pub fn is_private(&self) -> bool {
        self.symbol.contains(PRIVATE_MARKER)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fund {
    pub name: String,
    pub holdings: Vec<Holding>,
}

/// All tracked funds, in the order they appear in the holdings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Holdings {
    funds: Vec<Fund>,
}

impl Holdings {
    pub fn new(funds: Vec<Fund>) -> Self {
        Self { funds }
    }

    /// Reads the holdings file. Missing or malformed files yield an empty set.
    pub async fn load(path: &Path) -> Self {
        let raw: Vec<u8> = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Holdings file {} unavailable: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_slice::<Holdings>(&raw) {
            Ok(holdings) => holdings,
            Err(e) => {
                warn!("Holdings file {} is not valid JSON: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn funds(&self) -> &[Fund] {
        &self.funds
    }

    pub fn fund_names(&self) -> impl Iterator<Item = &str> {
        self.funds.iter().map(|f| f.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }

    /// Unique quotable symbols across every fund, sorted
    pub fn trackable_symbols(&self) -> Vec<String> {
        self.funds
            .iter()
            .flat_map(|f| f.holdings.iter())
            .filter(|h| !h.is_private())
            .map(|h| h.symbol.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }
}

// * The file is a JSON object keyed by fund name; a map visitor keeps its key order
impl<'de> Deserialize<'de> for Holdings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HoldingsVisitor;

        impl<'de> Visitor<'de> for HoldingsVisitor {
            type Value = Holdings;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping fund names to holding lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Holdings, A::Error> {
                let mut funds: Vec<Fund> = Vec::with_capacity(map.size_hint().unwrap_or(0));

                while let Some((name, holdings)) = map.next_entry::<String, Vec<Holding>>()? {
                    match funds.iter_mut().find(|f| f.name == name) {
                        Some(existing) => existing.holdings = holdings,
                        None => funds.push(Fund { name, holdings }),
                    }
                }

                Ok(Holdings { funds })
            }
        }

        deserializer.deserialize_map(HoldingsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "PDO": [{"symbol": "MSFT", "weight": 4.0}, {"symbol": "AAPL", "weight": 2.5}],
        "ADX": [{"symbol": "AAPL", "weight": 6.0}, {"symbol": "SPACEX_PVT", "weight": 1.5}]
    }"#;

    #[test]
    fn keeps_fund_order_from_file() {
        let holdings: Holdings = serde_json::from_str(SAMPLE).unwrap();
        let names: Vec<&str> = holdings.fund_names().collect();

        assert_eq!(names, vec!["PDO", "ADX"]);
        assert_eq!(holdings.funds()[1].holdings[1].symbol, "SPACEX_PVT");
    }

    #[test]
    fn trackable_symbols_skip_private_and_dedupe() {
        let holdings: Holdings = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(holdings.trackable_symbols(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(serde_json::from_str::<Holdings>("[1, 2, 3]").is_err());
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let holdings = Holdings::load(Path::new("/definitely/not/here.json")).await;

        assert!(holdings.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        assert!(Holdings::load(&path).await.is_empty());
    }
}
