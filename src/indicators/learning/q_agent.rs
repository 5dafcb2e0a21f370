//! Tabular Q-learning trading policy
//!
//! The agent owns its Q-table, exploration rate and replay buffer. It is not
//! synchronized: use one instance per worker or wrap it in a mutex.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use super::quantizer::StateQuantizer;
use crate::common::math;
use crate::config::RlParams;
use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{Indicator, IndicatorCategory};
use crate::models::result::{IndicatorResult, Signal};

pub const RL_NAME: &str = "RL Trading Agent";

const ACTION_COUNT: usize = 3;
const EXPLORE_CONFIDENCE: f64 = 0.3;
const EXPLOIT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Sell = 0,
    Hold = 1,
    Buy = 2,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [Action::Sell, Action::Hold, Action::Buy];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn signal(self) -> Signal {
        match self {
            Action::Sell => Signal::Sell,
            Action::Hold => Signal::Hold,
            Action::Buy => Signal::Buy,
        }
    }
}

/// One stored transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub state: Vec<f64>,
    pub action: Action,
    pub reward: f64,
    pub next_state: Vec<f64>,
    pub done: bool,
}

/// Learned state of an agent, for callers that persist it themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTableSnapshot {
    pub quantizer: StateQuantizer,
    pub q_table: Vec<[f64; ACTION_COUNT]>,
    pub epsilon: f64,
    pub total_episodes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentStats {
    pub epsilon: f64,
    pub memory_size: usize,
    /// Decisions made through `get_action`.
    pub total_episodes: u64,
    pub table_rows: usize,
    pub injective_states: bool,
}

pub struct QLearningAgent {
    params: RlParams,
    quantizer: StateQuantizer,
    q_table: Vec<[f64; ACTION_COUNT]>,
    epsilon: f64,
    memory: VecDeque<Experience>,
    total_episodes: u64,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(params: RlParams) -> Result<Self, IndicatorError> {
        validate(&params)?;
        let quantizer = StateQuantizer::from_params(&params)?;
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let q_table = random_table(&mut rng, quantizer.rows());

        Ok(Self {
            epsilon: params.epsilon,
            memory: VecDeque::with_capacity(params.memory_capacity.min(1024)),
            params,
            quantizer,
            q_table,
            total_episodes: 0,
            rng,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn quantizer(&self) -> &StateQuantizer {
        &self.quantizer
    }

    /// Epsilon-greedy decision for `state`. Decays epsilon once per call.
    pub fn get_action(&mut self, state: &[f64]) -> IndicatorResult {
        IndicatorResult::from_outcome(RL_NAME, self.try_get_action(state))
    }

    fn try_get_action(&mut self, state: &[f64]) -> Result<IndicatorResult, IndicatorError> {
        let state = self.prepare_state(state)?;
        let row = self.quantizer.index(&state);
        let q_values = self.q_table[row];

        let explored = self.rng.gen::<f64>() < self.epsilon;
        let action = if explored {
            Action::ALL[self.rng.gen_range(0..ACTION_COUNT)]
        } else {
            greedy(&q_values)
        };

        let (min_q, max_q) = q_values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), q| (lo.min(*q), hi.max(*q)));
        let spread = max_q - min_q;
        let strength = if spread > f64::EPSILON {
            (q_values[action.index()] - min_q) / spread
        } else {
            0.5
        };
        let confidence = if explored {
            EXPLORE_CONFIDENCE
        } else {
            EXPLOIT_CONFIDENCE
        };

        let epsilon_used = self.epsilon;
        self.epsilon = (self.epsilon * self.params.epsilon_decay).max(self.params.epsilon_min);
        self.total_episodes += 1;

        Ok(IndicatorResult::new(
            RL_NAME,
            action.index() as f64,
            action.signal(),
            strength,
            confidence,
        )
        .with_meta("action", action)
        .with_meta("q_values", q_values)
        .with_meta("state_index", row)
        .with_meta("exploration", explored)
        .with_meta("epsilon", epsilon_used)
        .with_meta("total_episodes", self.total_episodes)
        .with_meta("state_size", self.params.state_size))
    }

    /// Tabular Q-learning backup. Returns the updated Q-value.
    pub fn update_q_table(
        &mut self,
        state: &[f64],
        action: Action,
        reward: f64,
        next_state: &[f64],
        done: bool,
    ) -> Result<f64, IndicatorError> {
        if !reward.is_finite() {
            return Err(IndicatorError::NonFinite("reward"));
        }
        let row = self.quantizer.index(&self.prepare_state(state)?);
        let next_row = self.quantizer.index(&self.prepare_state(next_state)?);

        let target = if done {
            reward
        } else {
            let best_next = self.q_table[next_row]
                .iter()
                .fold(f64::NEG_INFINITY, |acc, q| acc.max(*q));
            reward + self.params.discount * best_next
        };

        let q = &mut self.q_table[row][action.index()];
        *q += self.params.learning_rate * (target - *q);
        Ok(*q)
    }

    /// Append a transition, evicting the oldest past capacity.
    pub fn save_experience(
        &mut self,
        state: &[f64],
        action: Action,
        reward: f64,
        next_state: &[f64],
        done: bool,
    ) {
        self.memory.push_back(Experience {
            state: state.to_vec(),
            action,
            reward,
            next_state: next_state.to_vec(),
            done,
        });
        while self.memory.len() > self.params.memory_capacity {
            self.memory.pop_front();
        }
    }

    pub fn memory(&self) -> impl Iterator<Item = &Experience> {
        self.memory.iter()
    }

    /// Q-values of the row `state` maps to.
    pub fn q_values(&self, state: &[f64]) -> Result<[f64; ACTION_COUNT], IndicatorError> {
        let state = self.prepare_state(state)?;
        Ok(self.q_table[self.quantizer.index(&state)])
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            epsilon: self.epsilon,
            memory_size: self.memory.len(),
            total_episodes: self.total_episodes,
            table_rows: self.quantizer.rows(),
            injective_states: self.quantizer.is_injective(),
        }
    }

    /// Reinitialise the table and forget all experience.
    pub fn reset(&mut self) {
        self.q_table = random_table(&mut self.rng, self.quantizer.rows());
        self.epsilon = self.params.epsilon;
        self.memory.clear();
        self.total_episodes = 0;
        debug!(rows = self.q_table.len(), "Q-learning agent reset");
    }

    pub fn snapshot(&self) -> QTableSnapshot {
        QTableSnapshot {
            quantizer: self.quantizer.clone(),
            q_table: self.q_table.clone(),
            epsilon: self.epsilon,
            total_episodes: self.total_episodes,
        }
    }

    /// Replace the learned state. The snapshot's quantizer must match this
    /// agent's state size and its table must match its row count.
    pub fn restore(&mut self, snapshot: QTableSnapshot) -> Result<(), IndicatorError> {
        if snapshot.quantizer.dims() != self.params.state_size {
            return Err(IndicatorError::invalid(
                "snapshot",
                format!(
                    "state size {} does not match agent state size {}",
                    snapshot.quantizer.dims(),
                    self.params.state_size
                ),
            ));
        }
        if snapshot.q_table.len() != snapshot.quantizer.rows() {
            return Err(IndicatorError::LengthMismatch {
                left: "q_table",
                left_len: snapshot.q_table.len(),
                right: "quantizer rows",
                right_len: snapshot.quantizer.rows(),
            });
        }
        if !(0.0..=1.0).contains(&snapshot.epsilon) {
            return Err(IndicatorError::invalid("epsilon", "must lie in [0, 1]"));
        }
        if !snapshot.q_table.iter().all(|row| math::all_finite(row)) {
            return Err(IndicatorError::NonFinite("q_table"));
        }

        self.quantizer = snapshot.quantizer;
        self.q_table = snapshot.q_table;
        self.epsilon = snapshot.epsilon;
        self.total_episodes = snapshot.total_episodes;
        Ok(())
    }

    /// Pad with zeros or truncate to `state_size`.
    fn prepare_state(&self, state: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        if !math::all_finite(state) {
            return Err(IndicatorError::NonFinite("state"));
        }
        let mut prepared = state[..state.len().min(self.params.state_size)].to_vec();
        prepared.resize(self.params.state_size, 0.0);
        Ok(prepared)
    }
}

impl Indicator for QLearningAgent {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Learning
    }

    fn name(&self) -> &'static str {
        RL_NAME
    }
}

fn validate(params: &RlParams) -> Result<(), IndicatorError> {
    if !(0.0..=1.0).contains(&params.epsilon) {
        return Err(IndicatorError::invalid("epsilon", "must lie in [0, 1]"));
    }
    if !(0.0..=1.0).contains(&params.epsilon_min) {
        return Err(IndicatorError::invalid("epsilon_min", "must lie in [0, 1]"));
    }
    if !(params.epsilon_decay > 0.0 && params.epsilon_decay <= 1.0) {
        return Err(IndicatorError::invalid("epsilon_decay", "must lie in (0, 1]"));
    }
    if !(params.learning_rate > 0.0 && params.learning_rate <= 1.0) {
        return Err(IndicatorError::invalid("learning_rate", "must lie in (0, 1]"));
    }
    if !(0.0..=1.0).contains(&params.discount) {
        return Err(IndicatorError::invalid("discount", "must lie in [0, 1]"));
    }
    if params.memory_capacity == 0 {
        return Err(IndicatorError::invalid("memory_capacity", "must be at least 1"));
    }
    Ok(())
}

fn random_table(rng: &mut StdRng, rows: usize) -> Vec<[f64; ACTION_COUNT]> {
    (0..rows)
        .map(|_| std::array::from_fn(|_| rng.gen_range(-1.0..=1.0)))
        .collect()
}

/// Highest-valued action; ties go to the lowest index.
fn greedy(q_values: &[f64; ACTION_COUNT]) -> Action {
    let mut best = 0;
    for (i, q) in q_values.iter().enumerate().skip(1) {
        if *q > q_values[best] {
            best = i;
        }
    }
    Action::ALL[best]
}
