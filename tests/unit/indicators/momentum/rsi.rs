//! Unit tests for RSI indicator

use chainsight::config::RsiParams;
use chainsight::indicators::momentum::{
    calculate_rsi, check_divergence, determine_trend, rsi_series, DivergenceType, RsiIndicator,
    RsiTrend, NEUTRAL_RSI,
};
use chainsight::Signal;
use proptest::prelude::*;

fn signal_tags(result: &chainsight::IndicatorResult) -> Vec<String> {
    result.metadata["signals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_rsi_constant_prices_are_neutral() {
    let result = RsiIndicator::default().calculate(&[100.0; 20]);

    assert!(!result.is_error());
    let series = result.value.as_series().unwrap();
    assert_eq!(series.len(), 20);
    assert!(series.iter().all(|v| *v == NEUTRAL_RSI));
    assert_eq!(signal_tags(&result), vec!["NEUTRAL"]);
    assert_eq!(result.signal, Signal::Hold);
}

#[test]
fn test_rsi_insufficient_data() {
    let result = RsiIndicator::default().calculate(&[100.0, 101.0, 102.0, 101.5]);

    assert!(!result.is_error());
    assert_eq!(result.confidence, 0.1);
    assert_eq!(result.value.as_series().unwrap(), &[NEUTRAL_RSI; 4]);
    assert_eq!(signal_tags(&result), vec!["INSUFFICIENT_DATA"]);
    assert_eq!(result.meta_str("trend"), Some("INSUFFICIENT_DATA"));
}

#[test]
fn test_rsi_empty_prices_is_error() {
    let result = RsiIndicator::default().calculate(&[]);
    assert!(result.is_error());
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn test_rsi_rising_prices_overbought() {
    let prices: Vec<f64> = (1..=30).map(|i| i as f64).collect();
    let result = RsiIndicator::default().calculate(&prices);

    assert_eq!(result.value.latest(), Some(100.0));
    assert_eq!(result.signal, Signal::Sell);
    assert_eq!(result.strength, 1.0);
    assert!(signal_tags(&result).contains(&"OVERBOUGHT".to_string()));
    assert!((result.confidence - 0.66).abs() < 1e-9);
}

#[test]
fn test_rsi_falling_prices_oversold() {
    let prices: Vec<f64> = (1..=30).rev().map(|i| i as f64).collect();
    let result = calculate_rsi(&prices, 14, 70.0, 30.0);

    assert_eq!(result.value.latest(), Some(0.0));
    assert_eq!(result.signal, Signal::Buy);
    assert!(signal_tags(&result).contains(&"OVERSOLD".to_string()));
}

#[test]
fn test_rsi_rejects_inverted_thresholds() {
    let rsi = RsiIndicator::new(RsiParams {
        period: 14,
        overbought: 30.0,
        oversold: 70.0,
    });
    assert!(rsi.calculate(&[1.0; 30]).is_error());
}

#[test]
fn test_rsi_metadata() {
    let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0).collect();
    let result = RsiIndicator::default().calculate(&prices);

    assert_eq!(result.meta_f64("period"), Some(14.0));
    assert_eq!(result.meta_f64("overbought_threshold"), Some(70.0));
    assert!(result.metadata.contains_key("divergence"));
    assert!(result.meta_str("interpretation").is_some());
    assert_eq!(result.meta_f64("current_rsi"), result.value.latest());
}

fn steps(count: usize, step: f64) -> Vec<f64> {
    (0..count).map(|i| 50.0 + i as f64 * step).collect()
}

#[test]
fn test_determine_trend_bands() {
    assert_eq!(determine_trend(&steps(4, 5.0)), RsiTrend::InsufficientData);
    assert_eq!(determine_trend(&steps(5, 3.0)), RsiTrend::StrongUptrend);
    assert_eq!(determine_trend(&steps(10, 1.0)), RsiTrend::Uptrend);
    assert_eq!(determine_trend(&steps(10, 0.2)), RsiTrend::Sideways);
    assert_eq!(determine_trend(&steps(10, -1.0)), RsiTrend::Downtrend);
    assert_eq!(determine_trend(&steps(10, -3.0)), RsiTrend::StrongDowntrend);
}

#[test]
fn test_determine_trend_uses_last_ten_values() {
    // A steep early rise followed by ten flat values reads sideways.
    let mut values = steps(10, 5.0);
    values.extend(std::iter::repeat(95.0).take(10));
    assert_eq!(determine_trend(&values), RsiTrend::Sideways);
}

#[test]
fn test_bearish_divergence() {
    let prices = steps(10, 1.0);
    let values = steps(10, -1.0);
    let divergence = check_divergence(&prices, &values);
    assert_eq!(divergence.kind, DivergenceType::Bearish);
    assert!((divergence.strength - 1.0).abs() < 1e-12);
}

#[test]
fn test_bullish_divergence() {
    let prices = steps(12, -0.5);
    let values = steps(12, 2.0);
    let divergence = check_divergence(&prices, &values);
    assert_eq!(divergence.kind, DivergenceType::Bullish);
    assert!((divergence.strength - 2.0).abs() < 1e-12);
}

#[test]
fn test_divergence_thresholds() {
    // RSI slope must pass ±0.5 against the price direction.
    assert_eq!(
        check_divergence(&steps(10, 1.0), &steps(10, -0.4)).kind,
        DivergenceType::None
    );
    assert_eq!(
        check_divergence(&steps(10, 1.0), &steps(10, 1.0)).kind,
        DivergenceType::None
    );
    assert_eq!(
        check_divergence(&steps(9, 1.0), &steps(9, -1.0)).kind,
        DivergenceType::None
    );
}

#[test]
fn test_reversal_up_tags_crossover_and_momentum() {
    // Thirty falling closes pin RSI at 0, then one large gain lifts it to ~75.
    let mut prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
    prices.push(111.0);
    let result = RsiIndicator::default().calculate(&prices);

    assert!(result.value.latest().unwrap() > 70.0);
    assert_eq!(
        signal_tags(&result),
        vec!["OVERBOUGHT", "BULLISH_MOMENTUM", "BULLISH_CROSSOVER"]
    );
}

#[test]
fn test_reversal_down_tags_crossover_and_momentum() {
    let mut prices: Vec<f64> = (0..30).map(|i| 71.0 + i as f64).collect();
    prices.push(60.0);
    let result = RsiIndicator::default().calculate(&prices);

    assert!(result.value.latest().unwrap() < 30.0);
    assert_eq!(
        signal_tags(&result),
        vec!["OVERSOLD", "BEARISH_MOMENTUM", "BEARISH_CROSSOVER"]
    );
    assert_eq!(result.signal, Signal::Buy);
}

proptest! {
    #[test]
    fn prop_rsi_non_decreasing_over_rising_run(
        prefix in prop::collection::vec(1.0f64..1000.0, 16..40),
        gains in prop::collection::vec(0.01f64..50.0, 1..30),
    ) {
        let start = prefix.len() - 1;
        let mut prices = prefix;
        let mut price = 1000.0;
        for gain in gains {
            price += gain;
            prices.push(price);
        }

        let values = rsi_series(&prices, 14);
        for pair in values[start..].windows(2) {
            prop_assert!(pair[1] >= pair[0] - 1e-9);
        }
    }

    #[test]
    fn prop_rsi_bounded(prices in prop::collection::vec(1.0f64..1000.0, 0..120), period in 1usize..30) {
        for value in rsi_series(&prices, period) {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}
