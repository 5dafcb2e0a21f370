//! Sentiment score over a batch of texts
//!
//! The classifier is chosen once at construction. Without a usable backend
//! the analyzer runs degraded: it draws a single uniform score in `[-1, 1]`
//! with fixed confidence 0.5 and marks the result `degraded`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use super::backend::{LexiconBackend, SentimentBackend};
use crate::common::math;
use crate::config::{SentimentBackendKind, SentimentConfig};
use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{Indicator, IndicatorCategory};
use crate::models::result::{IndicatorResult, Signal};

pub const SENTIMENT_NAME: &str = "Sentiment Analysis";

const FALLBACK_CONFIDENCE: f64 = 0.5;
const FALLBACK_MODEL: &str = "fallback";

enum Classifier {
    Model(Box<dyn SentimentBackend>),
    Fallback(StdRng),
}

pub struct SentimentAnalyzer {
    classifier: Classifier,
    buy_threshold: f64,
    sell_threshold: f64,
}

impl SentimentAnalyzer {
    /// Build from config, falling back to degraded mode when the configured
    /// backend is disabled or cannot be loaded.
    pub fn from_config(config: &SentimentConfig) -> Self {
        let backend = match config.backend {
            SentimentBackendKind::Disabled => {
                warn!("sentiment backend disabled, running in degraded mode");
                return Self::fallback(config);
            }
            SentimentBackendKind::Lexicon => match &config.lexicon_path {
                Some(path) => LexiconBackend::from_path(path),
                None => Ok(LexiconBackend::default()),
            },
        };

        match backend {
            Ok(backend) => {
                info!(backend = backend.name(), "sentiment backend loaded");
                Self::with_backend(Box::new(backend), config)
            }
            Err(err) => {
                warn!(error = %err, "sentiment backend unavailable, running in degraded mode");
                Self::fallback(config)
            }
        }
    }

    pub fn with_backend(backend: Box<dyn SentimentBackend>, config: &SentimentConfig) -> Self {
        Self {
            classifier: Classifier::Model(backend),
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
        }
    }

    pub fn fallback(config: &SentimentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            classifier: Classifier::Fallback(rng),
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
        }
    }

    /// Run [`Self::from_config`] on the blocking pool, keeping backend
    /// warm-up off the async workers.
    pub async fn load_in_background(config: SentimentConfig) -> Result<Self, IndicatorError> {
        tokio::task::spawn_blocking(move || Self::from_config(&config))
            .await
            .map_err(|e| IndicatorError::Backend(format!("backend loader task failed: {e}")))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.classifier, Classifier::Fallback(_))
    }

    pub fn model_name(&self) -> &str {
        match &self.classifier {
            Classifier::Model(backend) => backend.name(),
            Classifier::Fallback(_) => FALLBACK_MODEL,
        }
    }

    pub fn analyze(&mut self, texts: &[&str], sources: &[&str]) -> IndicatorResult {
        let outcome = self.try_analyze(texts, sources);
        IndicatorResult::from_outcome(SENTIMENT_NAME, outcome)
    }

    fn try_analyze(
        &mut self,
        texts: &[&str],
        sources: &[&str],
    ) -> Result<IndicatorResult, IndicatorError> {
        if !(self.sell_threshold < self.buy_threshold) {
            return Err(IndicatorError::invalid(
                "thresholds",
                format!(
                    "sell threshold {} must be below buy threshold {}",
                    self.sell_threshold, self.buy_threshold
                ),
            ));
        }
        if texts.is_empty() {
            return Err(IndicatorError::EmptyInput("texts"));
        }

        let model = self.model_name().to_string();
        let (score, confidence, scores) = match &mut self.classifier {
            Classifier::Model(backend) => {
                let scores = texts
                    .iter()
                    .map(|text| backend.classify(text).map(|p| p.score()))
                    .collect::<Result<Vec<f64>, _>>()?;
                let mean = math::mean(&scores).unwrap_or(0.0);
                let spread = math::standard_deviation(&scores).unwrap_or(0.0);
                (mean, 1.0 - spread, Some(scores))
            }
            Classifier::Fallback(rng) => (rng.gen_range(-1.0..=1.0), FALLBACK_CONFIDENCE, None),
        };

        let (signal, strength) = if score > self.buy_threshold {
            (Signal::Buy, score.abs().min(1.0))
        } else if score < self.sell_threshold {
            (Signal::Sell, score.abs().min(1.0))
        } else {
            (Signal::Hold, 0.5)
        };

        let degraded = scores.is_none();
        let mut result = IndicatorResult::new(SENTIMENT_NAME, score, signal, strength, confidence)
            .with_meta("text_count", texts.len())
            .with_meta("sources", sources)
            .with_meta("model_used", model)
            .with_meta("degraded", degraded);
        if let Some(scores) = scores {
            result = result.with_meta("text_scores", scores);
        }
        Ok(result)
    }
}

impl Indicator for SentimentAnalyzer {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Sentiment
    }

    fn name(&self) -> &'static str {
        SENTIMENT_NAME
    }
}
