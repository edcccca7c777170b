//! tests/tracker_cycle.rs
//! Background tracker: startup restore, cycles, day roll-over and file export.

mod common;

use std::path::Path;

use cef_nav::tracker::{ReferenceState, Tracker};
use common::{mock_sample_quotes, mock_telegram, sample_holdings, TestEnv};
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

fn read(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).expect("file exists")).expect("valid JSON")
}

#[tokio::test]
async fn start_fails_without_holdings_file() {
    let env = TestEnv::new(None).await;

    let result = Tracker::start(env.environment()).await;

    assert!(result.is_err());
    assert!(format!("{:#}", result.err().unwrap()).contains("Holdings file not found"));
}

#[tokio::test]
async fn start_restores_previous_dashboard_and_exports() {
    let env = TestEnv::new(Some(sample_holdings())).await;
    let dashboard_file = env.dir.path().join("dashboard_data.json");
    std::fs::write(
        &dashboard_file,
        json!({
            "last_updated": "09:00:00",
            "cefs": [{
                "name": "ADX", "implied_move": 0.02, "tracked_weight": 10.0, "status": "UP",
                "holdings": [{ "symbol": "BBB", "weight": 10.0, "change": 0.2, "source": "YAHOO" }]
            }]
        })
        .to_string(),
    )
    .unwrap();

    let tracker = Tracker::start(env.environment()).await.unwrap();

    assert_eq!(tracker.prices().len(), 1);
    assert_eq!(tracker.prices()["BBB"].price, None);

    let exported = read(&dashboard_file);
    assert_eq!(exported["cefs"][0]["name"], "PDO");
    assert_eq!(exported["cefs"][1]["implied_move"], 0.02);
    assert!(!env.dir.path().join("dashboard_data.json.tmp").exists());
}

#[tokio::test]
async fn cycle_exports_prices_alerts_and_reference() {
    let env = TestEnv::new(Some(sample_holdings())).await;
    mock_sample_quotes(&env.yahoo, 2).await;
    mock_telegram(&env.telegram, 200, 1).await;

    let mut tracker = Tracker::start(env.environment()).await.unwrap();
    tracker.cycle_at("2024-03-04").await.unwrap();
    // Second cycle on the same day: no repeated alert, baselines unchanged
    tracker.cycle_at("2024-03-04").await.unwrap();

    let exported = read(&env.dir.path().join("dashboard_data.json"));
    assert_eq!(exported["cefs"][0]["implied_move"], 2.0);
    assert_eq!(exported["cefs"][1]["implied_move"], 0.1);

    let reference: ReferenceState =
        serde_json::from_value(read(&env.dir.path().join("reference.json"))).unwrap();
    assert_eq!(reference.date, "2024-03-04");
    assert_eq!(reference.prices["AAA"], 120.0);
    assert_eq!(reference.prices["BBB"], 50.5);
}

#[tokio::test]
async fn new_day_resets_state_and_rearms_alerts() {
    let env = TestEnv::new(Some(sample_holdings())).await;
    mock_sample_quotes(&env.yahoo, 2).await;
    // One critical alert per day
    mock_telegram(&env.telegram, 200, 2).await;

    let mut tracker = Tracker::start(env.environment()).await.unwrap();
    tracker.cycle_at("2024-03-04").await.unwrap();

    assert!(tracker.roll_day("2024-03-05").await.unwrap());
    assert!(tracker.prices().is_empty());
    assert!(tracker.reference().prices.is_empty());
    assert!(!tracker.roll_day("2024-03-05").await.unwrap());

    tracker.cycle_at("2024-03-05").await.unwrap();
    assert_eq!(tracker.reference().date, "2024-03-05");
}

#[tokio::test]
async fn empty_snapshot_keeps_previous_values() {
    let env = TestEnv::new(Some(sample_holdings())).await;
    mock_sample_quotes(&env.yahoo, 1).await;
    mock_telegram(&env.telegram, 200, 1).await;
    let dashboard_file = env.dir.path().join("dashboard_data.json");

    let mut tracker = Tracker::start(env.environment()).await.unwrap();
    tracker.cycle_at("2024-03-04").await.unwrap();
    let before = read(&dashboard_file);
    assert_eq!(before["cefs"][0]["implied_move"], 2.0);

    // Yahoo now answers nothing useful: every symbol 404s
    env.yahoo.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&env.yahoo)
        .await;

    tracker.cycle_at("2024-03-04").await.unwrap();

    let after = read(&dashboard_file);
    assert_eq!(before, after);
    assert_eq!(tracker.prices().len(), 2);
    assert_eq!(tracker.prices()["AAA"].price, Some(120.0));
    assert_eq!(tracker.prices()["BBB"].price, Some(50.5));
}
