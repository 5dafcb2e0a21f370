//! Prometheus metrics for calculator outcomes.

use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::models::result::IndicatorResult;

pub struct Metrics {
    registry: Registry,
    pub results_total: IntCounterVec,
    pub last_confidence: GaugeVec,
    pub last_strength: GaugeVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let results_total = IntCounterVec::new(
            Opts::new(
                "chainsight_indicator_results_total",
                "Indicator results by indicator, outcome and signal",
            ),
            &["indicator", "outcome", "signal"],
        )?;
        let last_confidence = GaugeVec::new(
            Opts::new(
                "chainsight_indicator_confidence",
                "Confidence of the most recent result per indicator",
            ),
            &["indicator"],
        )?;
        let last_strength = GaugeVec::new(
            Opts::new(
                "chainsight_indicator_strength",
                "Signal strength of the most recent result per indicator",
            ),
            &["indicator"],
        )?;

        registry.register(Box::new(results_total.clone()))?;
        registry.register(Box::new(last_confidence.clone()))?;
        registry.register(Box::new(last_strength.clone()))?;

        Ok(Self {
            registry,
            results_total,
            last_confidence,
            last_strength,
        })
    }

    /// Record one calculator result.
    pub fn observe(&self, result: &IndicatorResult) {
        let outcome = if result.is_error() { "error" } else { "ok" };
        self.results_total
            .with_label_values(&[result.name.as_str(), outcome, result.signal.as_str()])
            .inc();
        self.last_confidence
            .with_label_values(&[result.name.as_str()])
            .set(result.confidence);
        self.last_strength
            .with_label_values(&[result.name.as_str()])
            .set(result.strength);
    }

    /// Text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
