//! Unit tests for GARCH volatility

use chainsight::config::GarchParams;
use chainsight::indicators::volatility::{
    conditional_variances, GarchCoefficients, GarchModel, VolatilityRegime,
};
use chainsight::models::{AssetClass, AssetData};
use proptest::prelude::*;

fn wavy_prices(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 * (0.001 * i as f64 + 0.02 * (i as f64 * 0.7).sin()).exp())
        .collect()
}

#[test]
fn test_garch_sufficient_data() {
    let asset = AssetData::new("BTC", AssetClass::Crypto, wavy_prices(150));
    let result = GarchModel::default().calculate(&asset);

    assert!(!result.is_error(), "{:?}", result.error_message());
    assert!(result.value.latest().unwrap() > 0.0);
    assert!((0.4..=0.8).contains(&result.confidence));
    assert_eq!(result.meta_str("symbol"), Some("BTC"));
    assert!(result.meta_f64("long_term_volatility").unwrap() > 0.0);
    assert_eq!(
        result.metadata["conditional_variances"].as_array().unwrap().len(),
        10
    );
}

#[test]
fn test_garch_insufficient_data() {
    let asset = AssetData::new("BTC", AssetClass::Crypto, wavy_prices(50));
    let result = GarchModel::default().calculate(&asset);
    assert!(result.is_error());
}

#[test]
fn test_garch_constant_prices_degenerate() {
    let asset = AssetData::new("BTC", AssetClass::Crypto, vec![100.0; 150]);
    assert!(GarchModel::default().calculate(&asset).is_error());
}

#[test]
fn test_garch_non_stationary_params_substituted() {
    let model = GarchModel::new(GarchParams {
        alpha: 0.3,
        beta: 0.8,
        ..GarchParams::default()
    });
    let asset = AssetData::new("ETH", AssetClass::Crypto, wavy_prices(150));
    let result = model.calculate(&asset);

    assert!(!result.is_error());
    assert_eq!(result.metadata["stationarity_adjusted"], true);
    let alpha = result.meta_f64("alpha").unwrap();
    let beta = result.meta_f64("beta").unwrap();
    assert!(alpha + beta < 1.0);
}

#[test]
fn test_garch_unsupported_order() {
    let model = GarchModel::new(GarchParams {
        p: 2,
        ..GarchParams::default()
    });
    let asset = AssetData::new("BTC", AssetClass::Crypto, wavy_prices(150));
    assert!(model.calculate(&asset).is_error());
}

#[test]
fn test_regime_metadata_matches_ratio() {
    let asset = AssetData::new("BTC", AssetClass::Crypto, wavy_prices(200));
    let result = GarchModel::default().calculate(&asset);
    let ratio = result.meta_f64("volatility_ratio").unwrap();
    let regime: VolatilityRegime =
        serde_json::from_value(result.metadata["regime"].clone()).unwrap();
    assert_eq!(regime, VolatilityRegime::from_ratio(ratio));
}

proptest! {
    #[test]
    fn prop_enforced_params_are_stationary(alpha in 0.0f64..2.0, beta in 0.0f64..2.0) {
        let params = GarchParams { alpha, beta, ..GarchParams::default() };
        let coefficients = GarchCoefficients::enforce_stationarity(&params).unwrap();
        prop_assert!(coefficients.alpha + coefficients.beta < 1.0);
    }

    #[test]
    fn prop_conditional_variance_positive(returns in prop::collection::vec(-0.5f64..0.5, 1..200)) {
        let coefficients = GarchCoefficients::enforce_stationarity(&GarchParams::default()).unwrap();
        for sigma2 in conditional_variances(&returns, &coefficients) {
            prop_assert!(sigma2 > 0.0);
        }
    }
}
