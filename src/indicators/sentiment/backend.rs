//! Text classification backends

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::indicators::error::IndicatorError;

/// Per-class probabilities, summing to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl ClassProbabilities {
    pub fn from_logits(negative: f64, neutral: f64, positive: f64) -> Self {
        let max = negative.max(neutral).max(positive);
        let (n, u, p) = (
            (negative - max).exp(),
            (neutral - max).exp(),
            (positive - max).exp(),
        );
        let total = n + u + p;
        Self {
            negative: n / total,
            neutral: u / total,
            positive: p / total,
        }
    }

    /// Signed score in `[-1, 1]`.
    pub fn score(&self) -> f64 {
        self.positive - self.negative
    }
}

/// A text classifier usable by [`super::SentimentAnalyzer`].
pub trait SentimentBackend: Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, text: &str) -> Result<ClassProbabilities, IndicatorError>;
}

const MAX_TOKENS: usize = 512;
const KEYWORD_WEIGHT: f64 = 1.5;
const NEUTRAL_LOGIT: f64 = 1.0;

const POSITIVE_WORDS: &[&str] = &[
    "adoption", "accumulate", "ath", "breakout", "bull", "bullish", "buy", "gain", "gains",
    "growth", "hodl", "moon", "optimistic", "outperform", "profit", "pump", "rally", "record",
    "recover", "recovery", "strong", "support", "surge", "up", "upgrade", "win",
];

const NEGATIVE_WORDS: &[&str] = &[
    "ban", "bear", "bearish", "collapse", "crash", "down", "dump", "exploit", "fear", "fraud",
    "fud", "hack", "hacked", "lawsuit", "liquidation", "loss", "losses", "panic", "plunge",
    "rug", "scam", "sell", "selloff", "weak", "crackdown", "bankrupt",
];

const NEGATORS: &[&str] = &["not", "no", "never", "isnt", "dont", "wont", "cant"];

#[derive(Debug, Deserialize)]
struct LexiconFile {
    positive: Vec<String>,
    negative: Vec<String>,
}

/// Keyword lexicon scored through a softmax over three logits.
///
/// A negator directly before a keyword flips its polarity.
#[derive(Debug, Clone)]
pub struct LexiconBackend {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Default for LexiconBackend {
    fn default() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().map(|w| w.to_string()).collect(),
            negative: NEGATIVE_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl LexiconBackend {
    /// Load a `{"positive": [...], "negative": [...]}` lexicon.
    pub fn from_path(path: &Path) -> Result<Self, IndicatorError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            IndicatorError::Backend(format!("cannot read lexicon {}: {e}", path.display()))
        })?;
        let file: LexiconFile = serde_json::from_str(&raw).map_err(|e| {
            IndicatorError::Backend(format!("invalid lexicon {}: {e}", path.display()))
        })?;
        if file.positive.is_empty() && file.negative.is_empty() {
            return Err(IndicatorError::Backend(format!(
                "lexicon {} has no words",
                path.display()
            )));
        }

        Ok(Self {
            positive: file.positive.iter().map(|w| w.to_lowercase()).collect(),
            negative: file.negative.iter().map(|w| w.to_lowercase()).collect(),
        })
    }

    /// Lowercased alphanumeric tokens. Apostrophes are dropped first so
    /// contractions stay whole ("isn't" reads as "isnt").
    pub fn tokenize(text: &str) -> Vec<String> {
        text.replace(|c: char| c == '\'' || c == '\u{2019}', "")
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .take(MAX_TOKENS)
            .map(|t| t.to_lowercase())
            .collect()
    }
}

impl SentimentBackend for LexiconBackend {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn classify(&self, text: &str) -> Result<ClassProbabilities, IndicatorError> {
        let tokens = Self::tokenize(text);
        let (mut positive, mut negative) = (0.0, 0.0);
        let mut negated = false;

        for token in &tokens {
            let polarity = if self.positive.contains(token) {
                1.0
            } else if self.negative.contains(token) {
                -1.0
            } else {
                negated = NEGATORS.contains(&token.as_str());
                continue;
            };
            let polarity = if negated { -polarity } else { polarity };
            if polarity > 0.0 {
                positive += 1.0;
            } else {
                negative += 1.0;
            }
            negated = false;
        }

        Ok(ClassProbabilities::from_logits(
            negative * KEYWORD_WEIGHT,
            NEUTRAL_LOGIT,
            positive * KEYWORD_WEIGHT,
        ))
    }
}
