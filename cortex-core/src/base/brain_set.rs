//! Ordered collections of brains.
use super::{Action, Brain, Mode};
use crate::error::CortexError;
use ndarray::ArrayD;
use std::collections::HashMap;

/// Typed per-brain state tensors, keyed by brain name.
pub type BrainStates = HashMap<String, ArrayD<f32>>;

/// Selected actions per brain, one entry per agent.
pub type BrainActions = HashMap<String, Vec<Action>>;

/// An ordered, immutable-membership collection of [`Brain`]s.
///
/// Iteration order equals construction order; reward aggregation and done
/// flattening across brains rely on it for deterministic output. Membership
/// never changes after construction, only the agents inside mutate their
/// learning state.
#[derive(Debug)]
pub struct BrainSet {
    brains: Vec<Brain>,
}

impl BrainSet {
    /// Builds a set from brains, preserving their order.
    ///
    /// Fails when two brains share a name.
    pub fn new(brains: Vec<Brain>) -> Result<Self, CortexError> {
        for (i, brain) in brains.iter().enumerate() {
            if brains[..i].iter().any(|b| b.name() == brain.name()) {
                return Err(CortexError::DuplicateBrainName(brain.name().to_string()));
            }
        }
        Ok(Self { brains })
    }

    /// Number of brains in the set.
    pub fn len(&self) -> usize {
        self.brains.len()
    }

    /// Returns `true` if the set holds no brains.
    pub fn is_empty(&self) -> bool {
        self.brains.is_empty()
    }

    /// Brain names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.brains.iter().map(|b| b.name().to_string()).collect()
    }

    /// Iterates `(name, brain)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Brain)> {
        self.brains.iter().map(|b| (b.name(), b))
    }

    /// Iterates over the brains in insertion order.
    pub fn brains(&self) -> std::slice::Iter<'_, Brain> {
        self.brains.iter()
    }

    /// Iterates mutably over the brains in insertion order.
    pub fn brains_mut(&mut self) -> std::slice::IterMut<'_, Brain> {
        self.brains.iter_mut()
    }

    /// Looks a brain up by name.
    pub fn get(&self, name: &str) -> Option<&Brain> {
        self.brains.iter().find(|b| b.name() == name)
    }

    /// Looks a brain up by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Brain> {
        self.brains.iter_mut().find(|b| b.name() == name)
    }

    /// For each brain, asks each of its agents for an action on the
    /// corresponding row of that brain's state tensor.
    pub fn get_actions(&mut self, states: &BrainStates) -> Result<BrainActions, CortexError> {
        let mut actions = BrainActions::new();
        for brain in self.brains.iter_mut() {
            let name = brain.name().to_string();
            let state = states
                .get(&name)
                .ok_or_else(|| CortexError::MissingBrain(name.clone()))?;
            let brain_actions = brain.get_actions(state);
            actions.insert(name, brain_actions);
        }
        Ok(actions)
    }

    /// Exploration actions for every agent of every brain.
    ///
    /// Only used during warmup.
    pub fn get_random_actions(&mut self) -> BrainActions {
        self.brains
            .iter_mut()
            .map(|b| (b.name().to_string(), b.get_random_actions()))
            .collect()
    }

    /// Applies mode and warmup flags to every agent of every brain.
    pub fn set_mode(&mut self, mode: Mode, warmup: bool) {
        for brain in self.brains.iter_mut() {
            brain.set_mode(mode, warmup);
        }
    }
}
