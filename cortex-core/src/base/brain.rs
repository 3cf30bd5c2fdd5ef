//! Brains: named groups of agents sharing one observation/action contract.
use super::{Action, Agent, Mode};
use crate::error::CortexError;
use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of observation block a brain reads from the environment payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationType {
    /// Flat per-agent feature vectors.
    Vector,

    /// Image-like per-agent observations.
    Visual,
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationType::Vector => write!(f, "vector"),
            ObservationType::Visual => write!(f, "visual"),
        }
    }
}

impl FromStr for ObservationType {
    type Err = CortexError;

    /// Parses `"vector"` or `"visual"`; any other label is a fatal
    /// configuration error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vector" => Ok(ObservationType::Vector),
            "visual" => Ok(ObservationType::Visual),
            _ => Err(CortexError::InvalidObservationType(s.to_string())),
        }
    }
}

/// Configuration of a [`Brain`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrainConfig {
    /// Name of the brain, the key into environment payloads.
    pub name: String,

    /// Number of action dimensions, or of choices for discrete actions.
    pub action_size: usize,

    /// Shape of a single agent's state.
    pub state_shape: Vec<usize>,

    /// Kind of observation block this brain reads.
    pub observation_type: ObservationType,
}

impl BrainConfig {
    /// Creates a configuration with vector observations and unit shapes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_size: 1,
            state_shape: vec![1],
            observation_type: ObservationType::Vector,
        }
    }

    /// Sets the number of action dimensions.
    pub fn action_size(mut self, v: usize) -> Self {
        self.action_size = v;
        self
    }

    /// Sets the shape of a single agent's state.
    pub fn state_shape(mut self, v: &[usize]) -> Self {
        self.state_shape = v.to_vec();
        self
    }

    /// Sets the observation type.
    pub fn observation_type(mut self, v: ObservationType) -> Self {
        self.observation_type = v;
        self
    }
}

/// Per-state preprocessing applied to a raw observation block before its
/// conversion into `f32` states.
pub type PreprocessFn = Box<dyn Fn(ArrayD<f64>) -> ArrayD<f64>>;

/// A named group of agents sharing one observation/action contract.
///
/// `action_size` and `state_shape` are fixed for the brain's lifetime and
/// must be consistent with every agent in the group. Brains are created once
/// at experiment-setup time and live for the whole simulator session.
pub struct Brain {
    name: String,
    action_size: usize,
    state_shape: Vec<usize>,
    observation_type: ObservationType,
    agents: Vec<Box<dyn Agent>>,
    preprocess_state_fn: PreprocessFn,
}

impl Brain {
    /// Builds a brain from its configuration and agents.
    ///
    /// Preprocessing defaults to the identity.
    pub fn new(config: BrainConfig, agents: Vec<Box<dyn Agent>>) -> Self {
        Self {
            name: config.name,
            action_size: config.action_size,
            state_shape: config.state_shape,
            observation_type: config.observation_type,
            agents,
            preprocess_state_fn: Box::new(|obs| obs),
        }
    }

    /// Replaces the identity preprocessing with a custom function.
    pub fn with_preprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(ArrayD<f64>) -> ArrayD<f64> + 'static,
    {
        self.preprocess_state_fn = Box::new(f);
        self
    }

    /// Name of the brain.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of action dimensions.
    pub fn action_size(&self) -> usize {
        self.action_size
    }

    /// Shape of a single agent's state.
    pub fn state_shape(&self) -> &[usize] {
        &self.state_shape
    }

    /// Kind of observation block this brain reads.
    pub fn observation_type(&self) -> ObservationType {
        self.observation_type
    }

    /// Number of agents in the group.
    pub fn n_agents(&self) -> usize {
        self.agents.len()
    }

    /// Iterates over the agents.
    pub fn agents(&self) -> std::slice::Iter<'_, Box<dyn Agent>> {
        self.agents.iter()
    }

    /// Iterates mutably over the agents.
    pub fn agents_mut(&mut self) -> std::slice::IterMut<'_, Box<dyn Agent>> {
        self.agents.iter_mut()
    }

    /// Applies the brain's preprocessing to a raw observation block.
    pub fn preprocess(&self, obs: ArrayD<f64>) -> ArrayD<f64> {
        (self.preprocess_state_fn)(obs)
    }

    /// Asks every agent for an action on its row of the state tensor.
    pub fn get_actions(&mut self, states: &ArrayD<f32>) -> Vec<Action> {
        self.agents
            .iter_mut()
            .enumerate()
            .map(|(i, agent)| agent.act(states.index_axis(Axis(0), i)))
            .collect()
    }

    /// Asks every agent for an exploration action.
    pub fn get_random_actions(&mut self) -> Vec<Action> {
        self.agents
            .iter_mut()
            .map(|agent| agent.random_action())
            .collect()
    }

    /// Applies mode and warmup flags to every agent.
    pub fn set_mode(&mut self, mode: Mode, warmup: bool) {
        for agent in self.agents.iter_mut() {
            agent.set_mode(mode);
            agent.set_warmup(warmup);
        }
    }
}

impl fmt::Debug for Brain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Brain")
            .field("name", &self.name)
            .field("action_size", &self.action_size)
            .field("state_shape", &self.state_shape)
            .field("observation_type", &self.observation_type)
            .field("n_agents", &self.agents.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_type_from_str() {
        assert_eq!(
            "vector".parse::<ObservationType>().unwrap(),
            ObservationType::Vector
        );
        assert_eq!(
            "visual".parse::<ObservationType>().unwrap(),
            ObservationType::Visual
        );
    }

    #[test]
    fn test_unknown_observation_type_fails() {
        let err = "audio".parse::<ObservationType>().unwrap_err();
        match err {
            CortexError::InvalidObservationType(s) => assert_eq!(s, "audio"),
            _ => panic!("unexpected error: {}", err),
        }
    }
}
