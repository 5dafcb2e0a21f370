//! Transaction graph health analysis
//!
//! The analyzer owns a directed multigraph of address-to-address transfers.
//! A reverse-adjacency index is maintained alongside the forward edges so the
//! health pass never scans the whole graph to find a node's predecessors.
//!
//! The analyzer is not synchronized; share it across threads only behind an
//! external lock, or keep one instance per worker.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error};

use crate::common::math;
use crate::config::GraphParams;
use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{Indicator, IndicatorCategory};
use crate::models::result::{IndicatorResult, Signal};
use crate::models::transaction::{Edge, NodeFeatures, Transaction};

pub const NETWORK_HEALTH_NAME: &str = "Network Health";

const HEALTHY: f64 = 0.7;
const UNHEALTHY: f64 = 0.3;
const MAX_CONFIDENCE: f64 = 0.8;
const CONFIDENCE_NODE_SCALE: f64 = 1000.0;
const ACTIVITY_SCALE: f64 = 100.0;

/// Aggregate statistics of one health pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub clustering_coefficient: f64,
    pub mean_centrality: f64,
    pub activity_mean: f64,
    pub activity_variance: f64,
}

impl GraphStats {
    /// Weighted blend of connectivity, clustering, centrality and activity.
    pub fn health_score(&self) -> f64 {
        0.3 * (self.density * 10.0).min(1.0)
            + 0.3 * self.clustering_coefficient.min(1.0)
            + 0.2 * self.mean_centrality.min(1.0)
            + 0.2 * (self.activity_mean / ACTIVITY_SCALE).min(1.0)
    }
}

#[derive(Debug, Default)]
pub struct TransactionGraphAnalyzer {
    params: GraphParams,
    index: HashMap<String, usize>,
    addresses: Vec<String>,
    adjacency: Vec<Vec<Edge>>,
    successors: Vec<HashSet<usize>>,
    predecessors: Vec<HashSet<usize>>,
    in_degree: Vec<usize>,
    features: Vec<NodeFeatures>,
    edge_count: usize,
}

impl TransactionGraphAnalyzer {
    pub fn new(params: GraphParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Discard all graph state.
    pub fn reset(&mut self) {
        self.index.clear();
        self.addresses.clear();
        self.adjacency.clear();
        self.successors.clear();
        self.predecessors.clear();
        self.in_degree.clear();
        self.features.clear();
        self.edge_count = 0;
    }

    /// Rebuild the graph from scratch.
    ///
    /// Returns `false` and leaves the graph empty when any transaction is
    /// invalid (blank address or a negative/non-finite amount).
    pub fn build_transaction_graph(&mut self, transactions: &[Transaction]) -> bool {
        self.reset();
        match self.fold_transactions(transactions) {
            Ok(()) => {
                debug!(
                    nodes = self.addresses.len(),
                    edges = self.edge_count,
                    "transaction graph built"
                );
                true
            }
            Err(err) => {
                error!(error = %err, "failed to build transaction graph: {}", err);
                self.reset();
                false
            }
        }
    }

    fn fold_transactions(&mut self, transactions: &[Transaction]) -> Result<(), IndicatorError> {
        let now = Utc::now();
        for (index, tx) in transactions.iter().enumerate() {
            if tx.from_address.is_empty() || tx.to_address.is_empty() {
                return Err(IndicatorError::InvalidTransaction {
                    index,
                    reason: "blank address".to_string(),
                });
            }
            if !tx.amount.is_finite() || tx.amount < 0.0 {
                return Err(IndicatorError::InvalidTransaction {
                    index,
                    reason: format!("amount {} is not a non-negative number", tx.amount),
                });
            }

            let timestamp = tx.timestamp.unwrap_or(now);
            let from = self.intern(&tx.from_address, timestamp);
            let to = self.intern(&tx.to_address, timestamp);

            self.adjacency[from].push(Edge {
                to: tx.to_address.clone(),
                amount: tx.amount,
                timestamp,
            });
            self.successors[from].insert(to);
            self.predecessors[to].insert(from);
            self.in_degree[to] += 1;
            self.edge_count += 1;

            self.features[from].total_sent += tx.amount;
            self.features[from].tx_count += 1;
            self.features[to].total_received += tx.amount;
        }
        Ok(())
    }

    fn intern(&mut self, address: &str, seen_at: chrono::DateTime<Utc>) -> usize {
        if let Some(&id) = self.index.get(address) {
            return id;
        }
        let id = self.addresses.len();
        self.index.insert(address.to_string(), id);
        self.addresses.push(address.to_string());
        self.adjacency.push(Vec::new());
        self.successors.push(HashSet::new());
        self.predecessors.push(HashSet::new());
        self.in_degree.push(0);
        self.features.push(NodeFeatures::new(seen_at));
        id
    }

    pub fn node_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn edges_from(&self, address: &str) -> Option<&[Edge]> {
        self.index.get(address).map(|&id| self.adjacency[id].as_slice())
    }

    pub fn node_features(&self, address: &str) -> Option<&NodeFeatures> {
        self.index.get(address).map(|&id| &self.features[id])
    }

    /// Score the current graph. Requires a prior successful build with at
    /// least one node.
    pub fn calculate_network_health(&self) -> IndicatorResult {
        IndicatorResult::from_outcome(NETWORK_HEALTH_NAME, self.try_network_health())
    }

    fn try_network_health(&self) -> Result<IndicatorResult, IndicatorError> {
        let stats = self.stats()?;
        let health = stats.health_score();

        let (signal, strength) = if health > HEALTHY {
            (Signal::Buy, health)
        } else if health < UNHEALTHY {
            (Signal::Sell, 1.0 - health)
        } else {
            (Signal::Hold, 0.5)
        };
        let confidence = (stats.nodes as f64 / CONFIDENCE_NODE_SCALE).min(MAX_CONFIDENCE);

        Ok(IndicatorResult::new(NETWORK_HEALTH_NAME, health, signal, strength, confidence)
            .with_meta("num_nodes", stats.nodes)
            .with_meta("num_edges", stats.edges)
            .with_meta("density", stats.density)
            .with_meta("clustering_coefficient", stats.clustering_coefficient)
            .with_meta("avg_degree_centrality", stats.mean_centrality)
            .with_meta("activity_mean", stats.activity_mean)
            .with_meta("activity_variance", stats.activity_variance)
            .with_meta("max_neighbors", self.params.max_neighbors))
    }

    /// Graph statistics feeding the health score.
    pub fn stats(&self) -> Result<GraphStats, IndicatorError> {
        let nodes = self.addresses.len();
        if nodes == 0 {
            return Err(IndicatorError::GraphNotBuilt);
        }

        let centralities: Vec<f64> = (0..nodes)
            .map(|id| {
                if nodes > 1 {
                    (self.adjacency[id].len() + self.in_degree[id]) as f64 / (nodes - 1) as f64
                } else {
                    0.0
                }
            })
            .collect();

        let density = if nodes > 1 {
            self.edge_count as f64 / (nodes * (nodes - 1)) as f64
        } else {
            0.0
        };

        let activity: Vec<f64> = self.features.iter().map(|f| f.tx_count as f64).collect();

        Ok(GraphStats {
            nodes,
            edges: self.edge_count,
            density,
            clustering_coefficient: self.clustering_coefficient(),
            mean_centrality: math::mean(&centralities).unwrap_or(0.0),
            activity_mean: math::mean(&activity).unwrap_or(0.0),
            activity_variance: math::variance(&activity).unwrap_or(0.0),
        })
    }

    /// Mean local clustering coefficient.
    ///
    /// Neighbors are undirected (successors ∪ predecessors, minus self). Each
    /// directed edge between two neighbors counts half a triangle, so a pair
    /// linked both ways counts once.
    pub fn clustering_coefficient(&self) -> f64 {
        let coefficients: Vec<f64> = (0..self.addresses.len())
            .map(|id| self.local_clustering(id))
            .collect();
        math::mean(&coefficients).unwrap_or(0.0)
    }

    fn local_clustering(&self, id: usize) -> f64 {
        let mut neighbors: Vec<usize> = self.successors[id]
            .union(&self.predecessors[id])
            .copied()
            .filter(|&n| n != id)
            .collect();
        neighbors.sort_unstable();
        if let Some(cap) = self.params.max_neighbors {
            neighbors.truncate(cap);
        }

        let k = neighbors.len();
        if k < 2 {
            return 0.0;
        }

        let mut triangles = 0.0;
        for &a in &neighbors {
            for &b in &neighbors {
                if a != b && self.successors[a].contains(&b) {
                    triangles += 0.5;
                }
            }
        }

        let possible = (k * (k - 1)) as f64 / 2.0;
        triangles / possible
    }
}

impl Indicator for TransactionGraphAnalyzer {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Network
    }

    fn name(&self) -> &'static str {
        NETWORK_HEALTH_NAME
    }
}
