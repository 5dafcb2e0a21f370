//! Unit tests for the Q-learning agent

use chainsight::config::RlParams;
use chainsight::indicators::learning::{Action, QLearningAgent, QTableSnapshot};

fn params(seed: u64) -> RlParams {
    RlParams {
        seed: Some(seed),
        ..RlParams::default()
    }
}

#[test]
fn test_terminal_updates_converge_to_reward() {
    let mut agent = QLearningAgent::new(params(7)).unwrap();
    let state = [0.2, -0.4, 0.9];
    let reward = 1.5;

    let mut distance = (agent.q_values(&state).unwrap()[Action::Buy.index()] - reward).abs();
    for _ in 0..200 {
        let q = agent
            .update_q_table(&state, Action::Buy, reward, &state, true)
            .unwrap();
        let next = (q - reward).abs();
        assert!(next < distance);
        distance = next;
    }
}

#[test]
fn test_bootstrapped_update_uses_next_state() {
    let mut agent = QLearningAgent::new(RlParams {
        learning_rate: 1.0,
        ..params(3)
    })
    .unwrap();
    let state = [-1.0; 10];
    let next_state = [1.0; 10];
    let best_next = agent
        .q_values(&next_state)
        .unwrap()
        .iter()
        .fold(f64::NEG_INFINITY, |acc, q| acc.max(*q));

    let q = agent
        .update_q_table(&state, Action::Hold, 0.5, &next_state, false)
        .unwrap();
    assert!((q - (0.5 + 0.95 * best_next)).abs() < 1e-12);
}

#[test]
fn test_epsilon_decays_to_floor() {
    let mut agent = QLearningAgent::new(params(1)).unwrap();
    let mut previous = agent.epsilon();
    for _ in 0..2000 {
        agent.get_action(&[0.1, 0.2]);
        assert!(agent.epsilon() <= previous);
        previous = agent.epsilon();
    }
    assert_eq!(agent.epsilon(), 0.01);
}

#[test]
fn test_exploitation_is_greedy() {
    let mut agent = QLearningAgent::new(RlParams {
        epsilon: 0.0,
        epsilon_min: 0.0,
        ..params(5)
    })
    .unwrap();
    let state = [0.3; 10];
    let q_values = agent.q_values(&state).unwrap();
    let result = agent.get_action(&state);

    assert_eq!(result.confidence, 0.8);
    assert_eq!(result.metadata["exploration"], false);
    let chosen = result.value.latest().unwrap() as usize;
    let best = q_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(q_values[chosen], best);
    assert_eq!(result.strength, 1.0);
    assert_eq!(result.signal, Action::from_index(chosen).unwrap().signal());
}

#[test]
fn test_exploration_confidence() {
    let mut agent = QLearningAgent::new(RlParams {
        epsilon: 1.0,
        epsilon_decay: 1.0,
        ..params(9)
    })
    .unwrap();
    for _ in 0..20 {
        let result = agent.get_action(&[0.0]);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.metadata["exploration"], true);
    }
}

#[test]
fn test_non_finite_state_is_error() {
    let mut agent = QLearningAgent::new(params(2)).unwrap();
    assert!(agent.get_action(&[f64::NAN]).is_error());
    assert!(agent
        .update_q_table(&[0.0], Action::Sell, f64::INFINITY, &[0.0], true)
        .is_err());
}

#[test]
fn test_snapshot_restore() {
    let mut trained = QLearningAgent::new(params(4)).unwrap();
    for _ in 0..10 {
        trained.get_action(&[0.5]);
        trained
            .update_q_table(&[0.5], Action::Buy, 1.0, &[0.5], true)
            .unwrap();
    }
    let json = serde_json::to_string(&trained.snapshot()).unwrap();
    let snapshot: QTableSnapshot = serde_json::from_str(&json).unwrap();

    let mut fresh = QLearningAgent::new(params(99)).unwrap();
    fresh.restore(snapshot).unwrap();
    let restored = fresh.q_values(&[0.5]).unwrap();
    let original = trained.q_values(&[0.5]).unwrap();
    for (a, b) in restored.iter().zip(&original) {
        assert!((a - b).abs() < 1e-12);
    }
    assert_eq!(fresh.stats().total_episodes, 10);
}

#[test]
fn test_snapshot_with_invalid_quantizer_is_rejected() {
    let empty_table = r#"{"quantizer":{"bins":3,"low":-1.0,"high":1.0,"dims":10,"rows":0},"q_table":[],"epsilon":0.5,"total_episodes":0}"#;
    let zero_bins = r#"{"quantizer":{"bins":0,"low":-1.0,"high":1.0,"dims":10,"rows":1},"q_table":[[0.0,0.0,0.0]],"epsilon":0.5,"total_episodes":0}"#;
    assert!(serde_json::from_str::<QTableSnapshot>(empty_table).is_err());
    assert!(serde_json::from_str::<QTableSnapshot>(zero_bins).is_err());

    let mut agent = QLearningAgent::new(params(12)).unwrap();
    assert!(!agent.get_action(&[0.1]).is_error());
}

#[test]
fn test_action_metadata_counts_decisions() {
    let mut agent = QLearningAgent::new(params(13)).unwrap();
    agent.update_q_table(&[0.1], Action::Buy, 1.0, &[0.1], true).unwrap();
    assert_eq!(agent.stats().total_episodes, 0);

    agent.get_action(&[0.1]);
    let result = agent.get_action(&[0.1]);
    assert_eq!(result.meta_f64("total_episodes"), Some(2.0));
    assert_eq!(result.meta_f64("state_size"), Some(10.0));
    assert_eq!(agent.stats().total_episodes, 2);
}

#[test]
fn test_restore_rejects_other_state_size() {
    let other = QLearningAgent::new(RlParams {
        state_size: 4,
        ..params(4)
    })
    .unwrap();
    let mut agent = QLearningAgent::new(params(4)).unwrap();
    assert!(agent.restore(other.snapshot()).is_err());
}

#[test]
fn test_reset_clears_learning_state() {
    let mut agent = QLearningAgent::new(params(6)).unwrap();
    agent.save_experience(&[0.1], Action::Buy, 1.0, &[0.2], true);
    agent.update_q_table(&[0.1], Action::Buy, 1.0, &[0.2], true).unwrap();
    agent.get_action(&[0.1]);

    agent.reset();
    let stats = agent.stats();
    assert_eq!(stats.memory_size, 0);
    assert_eq!(stats.total_episodes, 0);
    assert_eq!(stats.epsilon, 1.0);
}

#[test]
fn test_default_table_maps_states_injectively() {
    let agent = QLearningAgent::new(params(8)).unwrap();
    let stats = agent.stats();
    assert_eq!(stats.table_rows, 59_049);
    assert!(stats.injective_states);
}
