//! Per-step transition data.
use super::Action;
use ndarray::ArrayD;
use std::collections::HashMap;

/// The transition one brain's agents took in one environment step.
///
/// Constructed fresh each step by the simulator, consumed immediately by the
/// step hooks and not retained.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// States the actions were selected from, one row per agent.
    pub states: ArrayD<f32>,

    /// Selected actions, one per agent.
    pub actions: Vec<Action>,

    /// States after the step, one row per agent.
    pub next_states: ArrayD<f32>,

    /// Per-agent rewards reported by the environment.
    pub rewards: Vec<f32>,

    /// Per-agent episode-termination flags reported by the environment.
    pub dones: Vec<bool>,
}

/// Step results of all brains, keyed by brain name.
pub type StepResults = HashMap<String, StepResult>;
