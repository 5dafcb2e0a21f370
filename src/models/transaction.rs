use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single value transfer between two addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub from_address: String,
    pub to_address: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self {
            from_address: from.into(),
            to_address: to.into(),
            amount,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Outgoing edge stored in the adjacency map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub to: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate activity of one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFeatures {
    pub total_sent: f64,
    pub total_received: f64,
    pub tx_count: u64,
    pub first_seen: DateTime<Utc>,
}

impl NodeFeatures {
    pub fn new(first_seen: DateTime<Utc>) -> Self {
        Self {
            total_sent: 0.0,
            total_received: 0.0,
            tx_count: 0,
            first_seen,
        }
    }
}
