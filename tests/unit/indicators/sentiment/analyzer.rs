//! Unit tests for sentiment analysis

use chainsight::config::{SentimentBackendKind, SentimentConfig};
use chainsight::indicators::sentiment::{ClassProbabilities, SentimentAnalyzer, SentimentBackend};
use chainsight::indicators::IndicatorError;
use chainsight::Signal;
use std::io::Write;
use std::path::PathBuf;

struct FailingBackend;

impl SentimentBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn classify(&self, _text: &str) -> Result<ClassProbabilities, IndicatorError> {
        Err(IndicatorError::Backend("model offline".to_string()))
    }
}

#[test]
fn test_lexicon_positive_batch() {
    let mut analyzer = SentimentAnalyzer::from_config(&SentimentConfig::default());
    assert!(!analyzer.is_degraded());

    let result = analyzer.analyze(
        &["bullish rally surge", "bullish rally surge"],
        &["twitter", "reddit"],
    );
    assert_eq!(result.signal, Signal::Buy);
    assert!(result.value.latest().unwrap() > 0.9);
    assert!((result.confidence - 1.0).abs() < 1e-12);
    assert_eq!(result.meta_str("model_used"), Some("lexicon"));
    assert_eq!(result.metadata["degraded"], false);
    assert_eq!(result.meta_f64("text_count"), Some(2.0));
    assert_eq!(result.metadata["text_scores"].as_array().unwrap().len(), 2);
}

#[test]
fn test_lexicon_mixed_batch_lowers_confidence() {
    let mut analyzer = SentimentAnalyzer::from_config(&SentimentConfig::default());
    let result = analyzer.analyze(&["massive pump", "exchange hacked, total crash"], &["news"]);
    assert!(result.confidence < 1.0);
}

#[test]
fn test_contraction_negates_keyword() {
    let mut analyzer = SentimentAnalyzer::from_config(&SentimentConfig::default());
    let result = analyzer.analyze(&["BTC isn't bullish"], &["twitter"]);
    assert_eq!(result.signal, Signal::Sell);
}

#[test]
fn test_disabled_backend_is_degraded() {
    let config = SentimentConfig {
        backend: SentimentBackendKind::Disabled,
        seed: Some(7),
        ..SentimentConfig::default()
    };
    let mut analyzer = SentimentAnalyzer::from_config(&config);
    assert!(analyzer.is_degraded());

    let result = analyzer.analyze(&["anything"], &["news"]);
    assert!(!result.is_error());
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.metadata["degraded"], true);
    assert_eq!(result.meta_str("model_used"), Some("fallback"));
    let score = result.value.latest().unwrap();
    assert!((-1.0..=1.0).contains(&score));
}

#[test]
fn test_fallback_is_reproducible_with_seed() {
    let config = SentimentConfig {
        backend: SentimentBackendKind::Disabled,
        seed: Some(21),
        ..SentimentConfig::default()
    };
    let a = SentimentAnalyzer::from_config(&config).analyze(&["x"], &[]);
    let b = SentimentAnalyzer::from_config(&config).analyze(&["x"], &[]);
    assert_eq!(a.value, b.value);
}

#[test]
fn test_missing_lexicon_falls_back() {
    let config = SentimentConfig {
        lexicon_path: Some(PathBuf::from("/nonexistent/lexicon.json")),
        ..SentimentConfig::default()
    };
    assert!(SentimentAnalyzer::from_config(&config).is_degraded());
}

#[test]
fn test_custom_lexicon_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"positive": ["wagmi"], "negative": ["ngmi"]}}"#).unwrap();

    let config = SentimentConfig {
        lexicon_path: Some(file.path().to_path_buf()),
        ..SentimentConfig::default()
    };
    let mut analyzer = SentimentAnalyzer::from_config(&config);
    assert!(!analyzer.is_degraded());

    let result = analyzer.analyze(&["ngmi ngmi"], &["discord"]);
    assert_eq!(result.signal, Signal::Sell);
    // Built-in words are replaced, not extended.
    let neutral = analyzer.analyze(&["bullish"], &["discord"]);
    assert_eq!(neutral.signal, Signal::Hold);
}

#[test]
fn test_backend_failure_is_error_result() {
    let mut analyzer =
        SentimentAnalyzer::with_backend(Box::new(FailingBackend), &SentimentConfig::default());
    let result = analyzer.analyze(&["hello"], &["news"]);
    assert!(result.is_error());
    assert!(result.error_message().unwrap().contains("model offline"));
}

#[test]
fn test_empty_texts_is_error() {
    let mut analyzer = SentimentAnalyzer::from_config(&SentimentConfig::default());
    assert!(analyzer.analyze(&[], &[]).is_error());
}

#[tokio::test]
async fn test_load_in_background() {
    let analyzer = SentimentAnalyzer::load_in_background(SentimentConfig::default())
        .await
        .unwrap();
    assert!(!analyzer.is_degraded());
    assert_eq!(analyzer.model_name(), "lexicon");
}
