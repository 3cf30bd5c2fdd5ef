//! The environment boundary.
use anyhow::Result;
use ndarray::{Array2, ArrayD};
use std::collections::HashMap;

/// Raw per-brain payload returned by the environment.
///
/// At most one observation block is populated per brain; which one a brain
/// reads is decided by its
/// [`ObservationType`](crate::ObservationType).
#[derive(Clone, Debug)]
pub struct BrainInfo {
    /// Flat observations, one row per agent.
    pub vector_observations: Option<ArrayD<f64>>,

    /// Image-like observations, one leading entry per agent.
    pub visual_observations: Option<ArrayD<f64>>,

    /// Reward collected by each agent at this step.
    pub rewards: Vec<f32>,

    /// Per-agent episode-termination flags.
    pub local_done: Vec<bool>,
}

impl BrainInfo {
    /// Payload carrying only vector observations.
    pub fn vector(obs: ArrayD<f64>, rewards: Vec<f32>, local_done: Vec<bool>) -> Self {
        Self {
            vector_observations: Some(obs),
            visual_observations: None,
            rewards,
            local_done,
        }
    }

    /// Payload carrying only visual observations.
    pub fn visual(obs: ArrayD<f64>, rewards: Vec<f32>, local_done: Vec<bool>) -> Self {
        Self {
            vector_observations: None,
            visual_observations: Some(obs),
            rewards,
            local_done,
        }
    }
}

/// Environment response, keyed by brain name.
pub type EnvResponse = HashMap<String, BrainInfo>;

/// Raw action blocks handed to the environment, one row per agent.
pub type RawBrainActions = HashMap<String, Array2<f32>>;

/// The external simulated environment.
///
/// Calls block until the environment responds; there is no timeout or
/// cancellation support. Errors propagate to the caller unchanged and the
/// loop never retries them.
pub trait Env {
    /// Resets the environment and returns the initial payload.
    fn reset(&mut self, train_mode: bool) -> Result<EnvResponse>;

    /// Advances the simulation by one step.
    fn step(&mut self, actions: &RawBrainActions) -> Result<EnvResponse>;

    /// Shuts the environment down.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
