//! Every calculator folds precondition failures into the error result shape.

use chainsight::config::{RlParams, SentimentConfig};
use chainsight::indicators::forecast::ArimaModel;
use chainsight::indicators::learning::QLearningAgent;
use chainsight::indicators::momentum::RsiIndicator;
use chainsight::indicators::network::TransactionGraphAnalyzer;
use chainsight::indicators::onchain::{calculate_mvrv, calculate_sopr, mvrv_cycle, sopr_trend};
use chainsight::indicators::sentiment::SentimentAnalyzer;
use chainsight::indicators::trend::LogRegressionChannel;
use chainsight::indicators::volatility::GarchModel;
use chainsight::models::{AssetClass, AssetData};
use chainsight::{IndicatorResult, Signal};

fn assert_error_shape(result: &IndicatorResult) {
    assert_eq!(result.confidence, 0.0, "{} should fail", result.name);
    assert_eq!(result.strength, 0.0);
    assert_eq!(result.signal, Signal::Hold);
    assert_eq!(result.value.latest(), Some(0.0));
    assert!(!result.error_message().unwrap_or_default().is_empty());
}

#[test]
fn test_all_calculators_fail_soft() {
    let empty_asset = AssetData::new("BTC", AssetClass::Crypto, Vec::new());
    let mut agent = QLearningAgent::new(RlParams {
        seed: Some(1),
        ..RlParams::default()
    })
    .unwrap();
    let mut sentiment = SentimentAnalyzer::from_config(&SentimentConfig::default());

    let results = vec![
        RsiIndicator::default().calculate(&[]),
        GarchModel::default().calculate(&empty_asset),
        ArimaModel::default().calculate(&empty_asset),
        LogRegressionChannel::default().calculate(&[], &[]),
        calculate_mvrv(80.0, 0.0),
        calculate_sopr(-1.0, 0.0),
        mvrv_cycle(&[]),
        sopr_trend(&[], 7),
        TransactionGraphAnalyzer::default().calculate_network_health(),
        agent.get_action(&[f64::INFINITY]),
        sentiment.analyze(&[], &[]),
    ];

    for result in &results {
        assert_error_shape(result);
    }
}
