//! Unit tests for SOPR

use chainsight::indicators::onchain::{calculate_sopr, sopr_trend};
use chainsight::Signal;

#[test]
fn test_sopr_even_split_is_clipped_buy() {
    let result = calculate_sopr(50.0, 50.0);

    assert_eq!(result.value.latest(), Some(0.5));
    assert_eq!(result.signal, Signal::Buy);
    assert_eq!(result.strength, 1.0);
    assert_eq!(result.confidence, 0.85);
}

#[test]
fn test_sopr_near_parity_is_hold() {
    let result = calculate_sopr(96.0, 4.0);
    assert_eq!(result.signal, Signal::Hold);
    assert_eq!(result.strength, 0.5);
}

#[test]
fn test_sopr_no_outputs_is_error() {
    assert!(calculate_sopr(0.0, 0.0).is_error());
}

#[test]
fn test_sopr_trend_rising() {
    let history = [0.40, 0.45, 0.50, 0.55, 0.60, 0.65, 0.70, 0.75, 0.80];
    let result = sopr_trend(&history, 7);

    assert!(!result.is_error());
    assert_eq!(result.meta_str("trend"), Some("rising"));
    assert_eq!(result.value.latest(), Some(0.80));
    assert_eq!(result.signal, Signal::Buy);
    assert_eq!(result.confidence, 0.85);
}

#[test]
fn test_sopr_trend_flat_keeps_nonzero_confidence() {
    let result = sopr_trend(&[0.99; 10], 7);
    assert!(!result.is_error());
    assert_eq!(result.meta_str("trend"), Some("sideways"));
    assert!(result.confidence > 0.0);
}

#[test]
fn test_sopr_trend_rejects_short_window() {
    assert!(sopr_trend(&[0.9, 1.0, 1.1], 1).is_error());
    assert!(sopr_trend(&[0.9, 1.0], 7).is_error());
}
