//! Hook functions composed by the episode loop.
//!
//! Every hook has a default; callers override individual fields of
//! [`EpisodeHooks`] to change one behavior without touching the rest.
use crate::{BrainActions, BrainSet, RawBrainActions, Scores, StepResults};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Converts selected actions into the raw blocks the environment expects.
pub type ConvertActionsFn = dyn Fn(&BrainActions) -> RawBrainActions;

/// Per-step agent notification.
pub type StepAgentsFn = dyn FnMut(&mut BrainSet, &StepResults, usize);

/// Per-episode agent notification.
pub type StepEpisodeAgentsFn = dyn FnMut(&mut BrainSet, usize);

/// Converts one step's raw rewards into a per-agent accumulator row.
pub type BrainRewardAccumulationFn = dyn Fn(&[f32]) -> Array1<f32>;

/// Per-brain accumulated rewards over one episode, keyed by brain name.
pub type BrainScores = HashMap<String, Array1<f32>>;

/// Reduces per-brain accumulated rewards to the episode's scalar score.
pub type EpisodeRewardAccumulationFn = dyn Fn(&BrainScores) -> f32;

/// Formats the end-of-episode progress line.
pub type DisplayFn = dyn Fn(usize, f32, &Scores) -> String;

/// Decides whether the flattened done flags end the episode.
pub type EndEpisodeCriteriaFn = dyn Fn(&[bool]) -> bool;

/// Extracts the value compared against the solved score.
pub type AggregateScoreFn = dyn Fn(&Scores) -> f32;

/// The overridable hook functions of the episode loop.
pub struct EpisodeHooks {
    /// Action conversion, applied before every environment step.
    pub convert_actions_fn: Box<ConvertActionsFn>,

    /// Applied after every step with the fresh step results.
    pub step_agents_fn: Box<StepAgentsFn>,

    /// Applied once per episode after stepping finished.
    pub step_episode_agents_fn: Box<StepEpisodeAgentsFn>,

    /// Converts raw step rewards before elementwise accumulation.
    pub brain_reward_accumulation_fn: Box<BrainRewardAccumulationFn>,

    /// Aggregates per-brain accumulated rewards into the episode score.
    pub episode_reward_accumulation_fn: Box<EpisodeRewardAccumulationFn>,

    /// Progress line formatting.
    pub display_fn: Box<DisplayFn>,

    /// Episode termination predicate.
    pub end_episode_criteria_fn: Box<EndEpisodeCriteriaFn>,

    /// Solve signal extraction.
    pub aggregate_score_fn: Box<AggregateScoreFn>,
}

impl Default for EpisodeHooks {
    fn default() -> Self {
        Self {
            convert_actions_fn: Box::new(default_convert_actions),
            step_agents_fn: Box::new(default_step_agents),
            step_episode_agents_fn: Box::new(default_step_episode_agents),
            brain_reward_accumulation_fn: Box::new(default_brain_reward_accumulation),
            episode_reward_accumulation_fn: Box::new(default_episode_reward_accumulation),
            display_fn: Box::new(default_display),
            end_episode_criteria_fn: Box::new(default_end_episode_criteria),
            aggregate_score_fn: Box::new(default_aggregate_score),
        }
    }
}

/// Stacks each brain's actions into an `n_agents x action_size` block.
pub fn default_convert_actions(actions: &BrainActions) -> RawBrainActions {
    actions
        .iter()
        .map(|(name, acts)| {
            let width = acts.first().map(|a| a.len()).unwrap_or(0);
            let mut block = Array2::zeros((acts.len(), width));
            for (i, act) in acts.iter().enumerate() {
                block.row_mut(i).assign(&act.as_row());
            }
            (name.clone(), block)
        })
        .collect()
}

/// Forwards each brain's step result to that brain's agents.
///
/// The trait-default notification bodies are no-ops, so with unmodified
/// agents this hook has no effect.
pub fn default_step_agents(brain_set: &mut BrainSet, results: &StepResults, t: usize) {
    for brain in brain_set.brains_mut() {
        let name = brain.name().to_string();
        if let Some(result) = results.get(&name) {
            for (i, agent) in brain.agents_mut().enumerate() {
                agent.observe_step(result, i, t);
            }
        }
    }
}

/// Notifies every agent that the episode ended.
pub fn default_step_episode_agents(brain_set: &mut BrainSet, i_episode: usize) {
    for brain in brain_set.brains_mut() {
        for agent in brain.agents_mut() {
            agent.end_episode(i_episode);
        }
    }
}

/// Identity conversion of one step's raw rewards.
pub fn default_brain_reward_accumulation(rewards: &[f32]) -> Array1<f32> {
    Array1::from(rewards.to_vec())
}

/// Mean over brains of each brain's per-agent mean.
pub fn default_episode_reward_accumulation(brain_scores: &BrainScores) -> f32 {
    if brain_scores.is_empty() {
        return 0.0;
    }
    let sum: f32 = brain_scores
        .values()
        .map(|scores| scores.mean().unwrap_or(0.0))
        .sum();
    sum / brain_scores.len() as f32
}

/// The updating `Episode .. Score .. Average Score ..` progress line.
pub fn default_display(i_episode: usize, episode_score: f32, scores: &Scores) -> String {
    format!(
        "\rEpisode {}\tScore: {:.2}\tAverage Score: {:.2}",
        i_episode,
        episode_score,
        scores.mean_sliding_scores()
    )
}

/// The episode ends when every agent of every brain reports done.
pub fn default_end_episode_criteria(dones: &[bool]) -> bool {
    dones.iter().all(|d| *d)
}

/// Solve checks compare against the windowed mean.
pub fn default_aggregate_score(scores: &Scores) -> f32 {
    scores.mean_sliding_scores()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;
    use ndarray::arr1;

    #[test]
    fn test_default_convert_actions_stacks_rows() {
        let mut actions = BrainActions::new();
        actions.insert(
            "arm".to_string(),
            vec![
                Action::Continuous(arr1(&[0.1, 0.2])),
                Action::Continuous(arr1(&[0.3, 0.4])),
            ],
        );
        let raw = default_convert_actions(&actions);
        let block = &raw["arm"];
        assert_eq!(block.shape(), &[2, 2]);
        assert_eq!(block[[1, 0]], 0.3);
    }

    #[test]
    fn test_default_end_episode_criteria() {
        assert!(!default_end_episode_criteria(&[true, false, true]));
        assert!(default_end_episode_criteria(&[true, true]));
    }

    #[test]
    fn test_default_episode_reward_accumulation() {
        let mut brain_scores = BrainScores::new();
        brain_scores.insert("a".to_string(), arr1(&[1.0, 3.0]));
        brain_scores.insert("b".to_string(), arr1(&[4.0]));
        assert_eq!(default_episode_reward_accumulation(&brain_scores), 3.0);
    }
}
