//! Chainsight demo
//!
//! Runs every calculator once on synthetic data and prints the results as JSON,
//! followed by the Prometheus exposition of the outcome counters.

use chainsight::config::{get_environment, EngineConfig};
use chainsight::indicators::forecast::ArimaModel;
use chainsight::indicators::learning::{Action, QLearningAgent};
use chainsight::indicators::momentum::RsiIndicator;
use chainsight::indicators::network::TransactionGraphAnalyzer;
use chainsight::indicators::onchain::{calculate_mvrv, calculate_sopr, mvrv_cycle, sopr_trend};
use chainsight::indicators::sentiment::SentimentAnalyzer;
use chainsight::indicators::trend::LogRegressionChannel;
use chainsight::indicators::volatility::GarchModel;
use chainsight::logging;
use chainsight::metrics::Metrics;
use chainsight::models::{AssetClass, AssetData, Transaction};
use chainsight::IndicatorResult;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;
    logging::init_logging("info");
    info!(environment = %get_environment(), "Starting Chainsight demo");

    let metrics = Metrics::new()?;
    let mut rng = StdRng::seed_from_u64(42);

    let prices = random_walk(&mut rng, 250, 30_000.0);
    let start = Utc::now() - Duration::days(prices.len() as i64);
    let timestamps: Vec<_> = (0..prices.len())
        .map(|i| start + Duration::days(i as i64))
        .collect();
    let asset = AssetData::new("BTC", AssetClass::Crypto, prices.clone());

    let mut results: Vec<IndicatorResult> = vec![
        RsiIndicator::new(config.rsi.clone()).calculate(&prices),
        GarchModel::new(config.garch.clone()).calculate(&asset),
        ArimaModel::new(config.arima.clone()).calculate(&asset),
        LogRegressionChannel::new(config.log_regression.clone()).calculate(&prices, &timestamps),
        calculate_mvrv(8.5e11, 5.0e11),
        calculate_sopr(1.2e9, 0.8e9),
    ];

    let mvrv_history: Vec<f64> = (0..120)
        .map(|i| 1.8 + (i as f64 / 15.0).sin() + rng.gen_range(-0.1..0.1))
        .collect();
    results.push(mvrv_cycle(&mvrv_history));
    let sopr_history: Vec<f64> = (0..14).map(|i| 0.4 + i as f64 * 0.01).collect();
    results.push(sopr_trend(&sopr_history, 7));

    let addresses: Vec<String> = (0..25).map(|i| format!("addr{i}")).collect();
    let transactions: Vec<Transaction> = (0..200)
        .map(|_| {
            let from = &addresses[rng.gen_range(0..addresses.len())];
            let to = &addresses[rng.gen_range(0..addresses.len())];
            Transaction::new(from.as_str(), to.as_str(), rng.gen_range(0.01..5.0))
        })
        .collect();
    let mut graph = TransactionGraphAnalyzer::new(config.graph.clone());
    graph.build_transaction_graph(&transactions);
    results.push(graph.calculate_network_health());

    let mut agent = QLearningAgent::new(config.rl.clone())?;
    let state: Vec<f64> = prices
        .windows(2)
        .rev()
        .take(config.rl.state_size)
        .map(|w| (w[1] / w[0]).ln() * 10.0)
        .collect();
    agent.update_q_table(&state, Action::Hold, 0.0, &state, true)?;
    results.push(agent.get_action(&state));

    let mut sentiment = SentimentAnalyzer::load_in_background(config.sentiment.clone()).await?;
    results.push(sentiment.analyze(
        &[
            "Bitcoin breakout to a new record, bulls in control",
            "Exchange hacked, panic selling across alts",
            "ETF adoption keeps growing",
        ],
        &["news", "social", "news"],
    ));

    for result in &results {
        metrics.observe(result);
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    println!("{}", metrics.export()?);
    Ok(())
}

fn random_walk(rng: &mut StdRng, len: usize, start: f64) -> Vec<f64> {
    let mut price = start;
    (0..len)
        .map(|_| {
            price *= (rng.gen_range(-0.03..0.032_f64)).exp();
            price
        })
        .collect()
}
