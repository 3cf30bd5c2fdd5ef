//! Drive [`Agent`](crate::Agent)s through episodes of a simulated environment.
mod config;
pub mod hooks;

use crate::{
    error::CortexError,
    record::{Record, RecordValue::Scalar, Recorder},
    BrainSet, BrainStates, Env, EnvResponse, Mode, ObservationType, Scores, StepResult,
    StepResults,
};
use anyhow::Result;
pub use config::{EvalConfig, PerformanceConfig, SimulatorConfig, TrainConfig, WarmupConfig};
use hooks::{BrainScores, ConvertActionsFn};
pub use hooks::EpisodeHooks;
use log::info;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Outcome of a training run.
#[derive(Debug)]
pub struct TrainReport {
    /// Scores of every completed episode.
    pub scores: Scores,

    /// Index of the last completed episode, starting at 1.
    pub i_episode: usize,

    /// Wall-clock time spent in the run.
    pub elapsed: Duration,
}

/// Outcome of an evaluation run.
#[derive(Debug)]
pub struct EvalReport {
    /// Scores of every evaluation episode.
    pub scores: Scores,

    /// Windowed mean over the evaluation episodes, the final performance
    /// number of the run.
    pub average_score: f32,
}

/// Supplementary information from a performance measurement.
#[derive(Debug)]
pub struct PerformanceInfo {
    /// Training scores backing the measurement.
    pub scores: Scores,

    /// Wall-clock training time.
    pub train_time: Duration,

    /// Episodes trained over.
    pub n_train_episodes: usize,

    /// Window the performance mean was computed over.
    pub sliding_window_size: usize,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// The episode loop engine.
///
/// Owns the environment and sequences episodes against a [`BrainSet`]:
///
/// ```mermaid
/// graph LR
///     A[Simulator]-->|states|B[BrainSet]
///     B -->|actions|A
///     A -->|raw actions|C[Env]
///     C -->|payload|A
///     A -->|StepResult|D[EpisodeHooks]
///     D -->|score|E[Scores]
/// ```
///
/// Three entry points drive the loop: [`warmup`](Simulator::warmup)
/// (random-action exploration, no scoring), [`train`](Simulator::train)
/// (learning enabled, optional solved-score early stop) and
/// [`evaluate`](Simulator::evaluate) (learning disabled, fixed episode
/// count). Control flow is single-threaded and blocks on the environment;
/// environment errors abort the run unchanged.
pub struct Simulator<E: Env> {
    task_name: String,
    env: E,
    env_response: Option<EnvResponse>,
    training_scores: Option<Scores>,
    evaluation_scores: Option<Scores>,
}

impl<E: Env> Simulator<E> {
    /// Builds a simulator around an environment.
    ///
    /// The seed is applied once here; episodes are not reseeded.
    pub fn build(config: SimulatorConfig, env: E) -> Self {
        fastrand::seed(config.seed);
        Self {
            task_name: config.task_name,
            env,
            env_response: None,
            training_scores: None,
            evaluation_scores: None,
        }
    }

    /// Name of the task this simulator drives.
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Scores of the latest training run.
    pub fn training_scores(&self) -> Option<&Scores> {
        self.training_scores.as_ref()
    }

    /// Scores of the latest evaluation run.
    pub fn evaluation_scores(&self) -> Option<&Scores> {
        self.evaluation_scores.as_ref()
    }

    /// Resets the environment and keeps its initial payload.
    pub fn reset_env(&mut self, train_mode: bool) -> Result<()> {
        self.env_response = Some(self.env.reset(train_mode)?);
        Ok(())
    }

    /// Builds typed per-brain state tensors from the latest payload.
    ///
    /// Fetches the observation block matching each brain's observation type,
    /// applies the brain's preprocessing and converts to `f32`. Fails before
    /// any further environment interaction when a brain's block is absent
    /// from the payload.
    pub fn get_next_states(&self, brain_set: &BrainSet) -> Result<BrainStates> {
        let response = self.env_response.as_ref().ok_or(CortexError::NotReset)?;
        let mut states = BrainStates::new();
        for (name, brain) in brain_set.iter() {
            let info = response
                .get(name)
                .ok_or_else(|| CortexError::MissingBrain(name.to_string()))?;
            let block = match brain.observation_type() {
                ObservationType::Vector => info.vector_observations.as_ref(),
                ObservationType::Visual => info.visual_observations.as_ref(),
            };
            let raw = block.ok_or_else(|| CortexError::MissingObservations {
                brain: name.to_string(),
                kind: brain.observation_type(),
            })?;
            let obs = brain.preprocess(raw.clone());
            states.insert(name.to_string(), obs.mapv(|v| v as f32));
        }
        Ok(states)
    }

    /// Performs one synchronized environment step.
    ///
    /// Obtains actions (policy or exploration) from the brain set, converts
    /// them to the raw format, steps the environment, recomputes states and
    /// assembles the per-brain [`StepResult`]s. All raw-shape assumptions
    /// about the environment live here.
    pub fn step(
        &mut self,
        brain_set: &mut BrainSet,
        brain_states: &BrainStates,
        random_actions: bool,
        convert_actions_fn: &ConvertActionsFn,
    ) -> Result<StepResults> {
        let mut brain_actions = if random_actions {
            brain_set.get_random_actions()
        } else {
            brain_set.get_actions(brain_states)?
        };

        let raw_actions = convert_actions_fn(&brain_actions);
        self.env_response = Some(self.env.step(&raw_actions)?);
        let mut next_states = self.get_next_states(brain_set)?;

        let response = self.env_response.as_ref().ok_or(CortexError::NotReset)?;
        let mut results = StepResults::new();
        for name in brain_set.names() {
            let info = response
                .get(&name)
                .ok_or_else(|| CortexError::MissingBrain(name.clone()))?;
            let states = brain_states
                .get(&name)
                .ok_or_else(|| CortexError::MissingBrain(name.clone()))?
                .clone();
            let actions = brain_actions.remove(&name).unwrap_or_default();
            let next = next_states
                .remove(&name)
                .ok_or_else(|| CortexError::MissingBrain(name.clone()))?;
            results.insert(
                name,
                StepResult {
                    states,
                    actions,
                    next_states: next,
                    rewards: info.rewards.clone(),
                    dones: info.local_done.clone(),
                },
            );
        }
        Ok(results)
    }

    /// Random-action exploration over a fixed number of episodes.
    ///
    /// Agents run in training mode with the warmup flag on; every action is
    /// an exploration action and no scores are recorded. Typically used to
    /// fill experience buffers before learning begins.
    pub fn warmup(
        &mut self,
        brain_set: &mut BrainSet,
        config: &WarmupConfig,
        hooks: &mut EpisodeHooks,
    ) -> Result<()> {
        println!(
            "Performing warmup with {} episodes and max_t={}",
            config.n_episodes, config.max_t
        );
        brain_set.set_mode(Mode::Train, true);

        let t_start = Instant::now();
        for i_episode in 1..=config.n_episodes {
            self.reset_env(true)?;
            let mut brain_states = self.get_next_states(brain_set)?;

            for t in 0..config.max_t {
                let results =
                    self.step(brain_set, &brain_states, true, hooks.convert_actions_fn.as_ref())?;
                (hooks.step_agents_fn)(brain_set, &results, t);

                for (name, result) in results.iter() {
                    brain_states.insert(name.clone(), result.next_states.clone());
                }

                let dones = all_dones(brain_set, &results);
                if (hooks.end_episode_criteria_fn)(&dones) {
                    break;
                }

                print!("\rEpisode {}\tTimestep: {}", i_episode, t);
                io::stdout().flush()?;
            }
        }
        println!("\nFinished warmup in {}s", t_start.elapsed().as_secs());
        Ok(())
    }

    /// Runs the training loop.
    ///
    /// Scores are recorded every episode; when `solved_score` is set, the
    /// run stops early once the aggregated windowed mean reaches it. One
    /// aggregated [`Record`] per episode is written to `recorder`.
    pub fn train(
        &mut self,
        brain_set: &mut BrainSet,
        config: &TrainConfig,
        hooks: &mut EpisodeHooks,
        recorder: &mut dyn Recorder,
    ) -> Result<TrainReport> {
        brain_set.set_mode(Mode::Train, false);
        let mut scores = Scores::new(config.sliding_window_size);
        let mut i_episode = 0;
        let t_start = Instant::now();

        for episode in 1..=config.n_episodes {
            i_episode = episode;
            self.reset_env(true)?;
            let mut brain_states = self.get_next_states(brain_set)?;
            let mut brain_scores = BrainScores::new();

            for t in 0..config.max_t {
                let results = self.step(
                    brain_set,
                    &brain_states,
                    false,
                    hooks.convert_actions_fn.as_ref(),
                )?;
                (hooks.step_agents_fn)(brain_set, &results, t);

                accumulate_rewards(&mut brain_states, &mut brain_scores, &results, hooks);

                let dones = all_dones(brain_set, &results);
                if (hooks.end_episode_criteria_fn)(&dones) {
                    break;
                }
            }

            (hooks.step_episode_agents_fn)(brain_set, episode);

            let episode_score = (hooks.episode_reward_accumulation_fn)(&brain_scores);
            scores.add(episode_score);
            recorder.write(episode_record(episode, episode_score, &scores));

            let line = (hooks.display_fn)(episode, episode_score, &scores);
            if episode % 100 == 0 {
                println!("{}", line);
            } else {
                print!("{}", line);
                io::stdout().flush()?;
            }

            if let Some(solved_score) = config.solved_score {
                if (hooks.aggregate_score_fn)(&scores) >= solved_score {
                    println!(
                        "\nTotal Training time = {:.1} min",
                        t_start.elapsed().as_secs_f64() / 60.0
                    );
                    println!(
                        "Environment solved in {} episodes!\tAverage Score: {:.2}",
                        episode,
                        scores.mean_sliding_scores()
                    );
                    info!("Task {} solved in {} episodes", self.task_name, episode);
                    break;
                }
            }
        }

        let elapsed = t_start.elapsed();
        self.training_scores = Some(scores.clone());
        Ok(TrainReport {
            scores,
            i_episode,
            elapsed,
        })
    }

    /// Runs evaluation episodes with learning disabled.
    ///
    /// Always runs the full episode count against a fresh score tracker;
    /// agents receive no per-step or per-episode notification, so their
    /// learning state is untouched.
    pub fn evaluate(
        &mut self,
        brain_set: &mut BrainSet,
        config: &EvalConfig,
        hooks: &mut EpisodeHooks,
        recorder: &mut dyn Recorder,
    ) -> Result<EvalReport> {
        brain_set.set_mode(Mode::Eval, false);
        let mut scores = Scores::new(config.sliding_window_size);

        for i_episode in 1..=config.n_episodes {
            self.reset_env(false)?;
            let mut brain_states = self.get_next_states(brain_set)?;
            let mut brain_scores = BrainScores::new();

            for _t in 0..config.max_t {
                let results = self.step(
                    brain_set,
                    &brain_states,
                    false,
                    hooks.convert_actions_fn.as_ref(),
                )?;

                accumulate_rewards(&mut brain_states, &mut brain_scores, &results, hooks);

                let dones = all_dones(brain_set, &results);
                if (hooks.end_episode_criteria_fn)(&dones) {
                    break;
                }
            }

            let episode_score = (hooks.episode_reward_accumulation_fn)(&brain_scores);
            scores.add(episode_score);
            recorder.write(episode_record(i_episode, episode_score, &scores));
            println!("{}", (hooks.display_fn)(i_episode, episode_score, &scores));
        }

        let average_score = scores.mean_sliding_scores();
        self.evaluation_scores = Some(scores.clone());
        Ok(EvalReport {
            scores,
            average_score,
        })
    }

    /// Trains without a solved score and reports the windowed mean as the
    /// brain set's performance, with supplementary run information.
    pub fn agent_performance(
        &mut self,
        brain_set: &mut BrainSet,
        config: &PerformanceConfig,
        hooks: &mut EpisodeHooks,
        recorder: &mut dyn Recorder,
    ) -> Result<(f32, PerformanceInfo)> {
        let train_config = TrainConfig::default()
            .n_episodes(config.n_train_episodes)
            .max_t(config.max_t)
            .sliding_window_size(config.sliding_window_size);
        let report = self.train(brain_set, &train_config, hooks, recorder)?;

        let performance = report.scores.mean_sliding_scores();
        let info = PerformanceInfo {
            scores: report.scores,
            train_time: report.elapsed,
            n_train_episodes: config.n_train_episodes,
            sliding_window_size: config.sliding_window_size,
        };
        Ok((performance, info))
    }

    /// Shuts the environment down.
    pub fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}

/// Flattens every brain's done flags in brain-set order.
fn all_dones(brain_set: &BrainSet, results: &StepResults) -> Vec<bool> {
    let mut dones = Vec::new();
    for name in brain_set.names() {
        if let Some(result) = results.get(&name) {
            dones.extend_from_slice(&result.dones);
        }
    }
    dones
}

/// Advances the per-brain states and reward accumulators by one step.
fn accumulate_rewards(
    brain_states: &mut BrainStates,
    brain_scores: &mut BrainScores,
    results: &StepResults,
    hooks: &EpisodeHooks,
) {
    for (name, result) in results.iter() {
        brain_states.insert(name.clone(), result.next_states.clone());
        let rewards = (hooks.brain_reward_accumulation_fn)(&result.rewards);
        match brain_scores.get_mut(name) {
            Some(acc) => *acc += &rewards,
            None => {
                brain_scores.insert(name.clone(), rewards);
            }
        }
    }
}

/// The aggregated per-episode record written to the recorder.
fn episode_record(i_episode: usize, episode_score: f32, scores: &Scores) -> Record {
    let mut record = Record::from_scalar("episode_score", episode_score);
    record.insert("episode", Scalar(i_episode as f32));
    record.insert("mean_sliding_score", Scalar(scores.mean_sliding_scores()));
    record
}
