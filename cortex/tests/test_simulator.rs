use std::{cell::Cell, rc::Rc};

use anyhow::Result;
use cortex::core::{
    record::{BufferedRecorder, NullRecorder},
    Action, Agent, Brain, BrainConfig, BrainInfo, BrainSet, Env, EnvResponse, EpisodeHooks,
    EvalConfig, Mode, ObservationType, PerformanceConfig, RawBrainActions, Simulator,
    SimulatorConfig, StepResult, TrainConfig, WarmupConfig,
};
use ndarray::{arr1, ArrayD, ArrayViewD};

const OBS_DIM: usize = 4;
const ACTION_SIZE: usize = 2;
const NEVER: usize = usize::MAX;

/// Shared counters observing an environment from outside the simulator.
#[derive(Clone, Default)]
struct EnvCounters {
    resets: Rc<Cell<usize>>,
    steps: Rc<Cell<usize>>,
}

struct ScriptedBrain {
    name: &'static str,
    observation_type: ObservationType,
    n_agents: usize,
    /// Number of steps after which every agent reports done.
    done_after: usize,
}

/// An environment that reports a constant reward and flips its done flags
/// after a scripted number of steps.
struct ScriptedEnv {
    brains: Vec<ScriptedBrain>,
    reward: f32,
    t: usize,
    counters: EnvCounters,
}

impl ScriptedEnv {
    fn new(brains: Vec<ScriptedBrain>, reward: f32) -> (Self, EnvCounters) {
        let counters = EnvCounters::default();
        let env = Self {
            brains,
            reward,
            t: 0,
            counters: counters.clone(),
        };
        (env, counters)
    }

    fn response(&self, initial: bool) -> EnvResponse {
        self.brains
            .iter()
            .map(|b| {
                let obs = ArrayD::zeros(vec![b.n_agents, OBS_DIM]);
                let rewards = if initial {
                    vec![0.0; b.n_agents]
                } else {
                    vec![self.reward; b.n_agents]
                };
                let done = !initial && self.t >= b.done_after;
                let info = match b.observation_type {
                    ObservationType::Vector => BrainInfo::vector(obs, rewards, vec![done; b.n_agents]),
                    ObservationType::Visual => BrainInfo::visual(obs, rewards, vec![done; b.n_agents]),
                };
                (b.name.to_string(), info)
            })
            .collect()
    }
}

impl Env for ScriptedEnv {
    fn reset(&mut self, _train_mode: bool) -> Result<EnvResponse> {
        self.t = 0;
        self.counters.resets.set(self.counters.resets.get() + 1);
        Ok(self.response(true))
    }

    fn step(&mut self, _actions: &RawBrainActions) -> Result<EnvResponse> {
        self.t += 1;
        self.counters.steps.set(self.counters.steps.get() + 1);
        Ok(self.response(false))
    }
}

/// Shared counters observing one agent from outside the simulator.
#[derive(Clone, Default)]
struct AgentProbe {
    observe_steps: Rc<Cell<usize>>,
    episodes: Rc<Cell<usize>>,
    random_actions: Rc<Cell<usize>>,
    mode: Rc<Cell<Option<Mode>>>,
    warmup: Rc<Cell<bool>>,
}

struct CountingAgent {
    probe: AgentProbe,
}

impl Agent for CountingAgent {
    fn act(&mut self, _state: ArrayViewD<f32>) -> Action {
        Action::Continuous(arr1(&[0.0; ACTION_SIZE]))
    }

    fn random_action(&mut self) -> Action {
        self.probe
            .random_actions
            .set(self.probe.random_actions.get() + 1);
        Action::Continuous(arr1(&[0.0; ACTION_SIZE]))
    }

    fn set_mode(&mut self, mode: Mode) {
        self.probe.mode.set(Some(mode));
    }

    fn set_warmup(&mut self, warmup: bool) {
        self.probe.warmup.set(warmup);
    }

    fn observe_step(&mut self, _step: &StepResult, _i: usize, _t: usize) {
        self.probe
            .observe_steps
            .set(self.probe.observe_steps.get() + 1);
    }

    fn end_episode(&mut self, _i_episode: usize) {
        self.probe.episodes.set(self.probe.episodes.get() + 1);
    }
}

fn counting_brain(name: &str, n_agents: usize) -> (Brain, Vec<AgentProbe>) {
    let mut agents: Vec<Box<dyn Agent>> = Vec::new();
    let mut probes = Vec::new();
    for _ in 0..n_agents {
        let probe = AgentProbe::default();
        probes.push(probe.clone());
        agents.push(Box::new(CountingAgent { probe }));
    }
    let config = BrainConfig::new(name)
        .action_size(ACTION_SIZE)
        .state_shape(&[OBS_DIM]);
    (Brain::new(config, agents), probes)
}

fn simulator(env: ScriptedEnv) -> Simulator<ScriptedEnv> {
    Simulator::build(SimulatorConfig::default().task_name("scripted"), env)
}

#[test]
fn test_episode_ends_when_environment_reports_done() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 1,
            done_after: 3,
        }],
        0.0,
    );
    let (brain, probes) = counting_brain("a", 1);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = TrainConfig::default().n_episodes(1).max_t(10);
    simulator.train(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    )?;

    assert_eq!(counters.steps.get(), 3);
    assert_eq!(probes[0].observe_steps.get(), 3);
    Ok(())
}

#[test]
fn test_step_budget_truncates_episode() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 1,
            done_after: 100,
        }],
        0.0,
    );
    let (brain, _probes) = counting_brain("a", 1);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = TrainConfig::default().n_episodes(1).max_t(5);
    simulator.train(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    )?;

    assert_eq!(counters.steps.get(), 5);
    Ok(())
}

// The default termination predicate requires every agent of every brain to
// report done; a single finished brain does not end the episode.
#[test]
fn test_termination_requires_all_brains_done() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![
            ScriptedBrain {
                name: "first",
                observation_type: ObservationType::Vector,
                n_agents: 2,
                done_after: 2,
            },
            ScriptedBrain {
                name: "second",
                observation_type: ObservationType::Vector,
                n_agents: 1,
                done_after: 4,
            },
        ],
        0.0,
    );
    let (first, _) = counting_brain("first", 2);
    let (second, _) = counting_brain("second", 1);
    let mut brain_set = BrainSet::new(vec![first, second])?;
    let mut simulator = simulator(env);

    let config = TrainConfig::default().n_episodes(1).max_t(10);
    simulator.train(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    )?;

    assert_eq!(counters.steps.get(), 4);
    Ok(())
}

#[test]
fn test_train_notifies_agents_once_per_step() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 2,
            done_after: 3,
        }],
        1.0,
    );
    let (brain, probes) = counting_brain("a", 2);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = TrainConfig::default().n_episodes(2).max_t(10);
    simulator.train(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    )?;

    assert_eq!(counters.resets.get(), 2);
    for probe in probes.iter() {
        assert_eq!(probe.observe_steps.get(), 6);
        assert_eq!(probe.episodes.get(), 2);
        assert_eq!(probe.mode.get(), Some(Mode::Train));
        assert!(!probe.warmup.get());
    }
    Ok(())
}

#[test]
fn test_evaluate_does_not_touch_learning_state() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 2,
            done_after: 4,
        }],
        1.0,
    );
    let (brain, probes) = counting_brain("a", 2);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = EvalConfig::default().n_episodes(3).max_t(10);
    let report = simulator.evaluate(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    )?;

    assert_eq!(counters.steps.get(), 12);
    for probe in probes.iter() {
        assert_eq!(probe.observe_steps.get(), 0);
        assert_eq!(probe.episodes.get(), 0);
        assert_eq!(probe.mode.get(), Some(Mode::Eval));
        assert!(!probe.warmup.get());
    }
    // Four steps of reward 1.0 per agent, averaged over agents and brains.
    assert!((report.average_score - 4.0).abs() < f32::EPSILON);
    assert_eq!(report.scores.len(), 3);
    Ok(())
}

#[test]
fn test_warmup_samples_random_actions() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 2,
            done_after: 2,
        }],
        0.0,
    );
    let (brain, probes) = counting_brain("a", 2);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = WarmupConfig::default().n_episodes(1).max_t(10);
    simulator.warmup(&mut brain_set, &config, &mut EpisodeHooks::default())?;

    assert_eq!(counters.steps.get(), 2);
    for probe in probes.iter() {
        assert_eq!(probe.random_actions.get(), 2);
        // Warmup still feeds experiences to the agents.
        assert_eq!(probe.observe_steps.get(), 2);
        assert_eq!(probe.mode.get(), Some(Mode::Train));
        assert!(probe.warmup.get());
    }
    Ok(())
}

#[test]
fn test_solved_score_stops_training_after_first_episode() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 1,
            done_after: 1,
        }],
        6.0,
    );
    let (brain, _) = counting_brain("a", 1);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = TrainConfig::default()
        .n_episodes(100)
        .max_t(10)
        .solved_score(5.0);
    let report = simulator.train(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    )?;

    assert_eq!(report.i_episode, 1);
    assert_eq!(counters.resets.get(), 1);
    assert!((report.scores.mean_sliding_scores() - 6.0).abs() < f32::EPSILON);
    Ok(())
}

#[test]
fn test_train_records_every_episode() -> Result<()> {
    let (env, _counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 1,
            done_after: 2,
        }],
        1.5,
    );
    let (brain, _) = counting_brain("a", 1);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);
    let mut recorder = BufferedRecorder::new();

    let config = TrainConfig::default().n_episodes(3).max_t(10);
    let report = simulator.train(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut recorder,
    )?;

    assert_eq!(report.i_episode, 3);
    assert_eq!(recorder.len(), 3);
    for (i, record) in recorder.iter().enumerate() {
        assert_eq!(record.get_scalar("episode")?, (i + 1) as f32);
        assert!((record.get_scalar("episode_score")? - 3.0).abs() < f32::EPSILON);
    }
    Ok(())
}

#[test]
fn test_missing_observation_block_fails_before_stepping() -> Result<()> {
    // The brain reads visual observations but the environment only serves
    // vector observations.
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 1,
            done_after: NEVER,
        }],
        0.0,
    );
    let config = BrainConfig::new("a")
        .action_size(ACTION_SIZE)
        .state_shape(&[OBS_DIM])
        .observation_type(ObservationType::Visual);
    let probe = AgentProbe::default();
    let brain = Brain::new(config, vec![Box::new(CountingAgent { probe })]);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = TrainConfig::default().n_episodes(1).max_t(10);
    let result = simulator.train(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    );

    assert!(result.is_err());
    assert_eq!(counters.steps.get(), 0);
    Ok(())
}

#[test]
fn test_agent_performance_reports_windowed_mean() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![ScriptedBrain {
            name: "a",
            observation_type: ObservationType::Vector,
            n_agents: 1,
            done_after: 2,
        }],
        1.0,
    );
    let (brain, _) = counting_brain("a", 1);
    let mut brain_set = BrainSet::new(vec![brain])?;
    let mut simulator = simulator(env);

    let config = PerformanceConfig::default()
        .n_train_episodes(4)
        .max_t(10)
        .sliding_window_size(2);
    let (performance, info) = simulator.agent_performance(
        &mut brain_set,
        &config,
        &mut EpisodeHooks::default(),
        &mut NullRecorder {},
    )?;

    assert_eq!(counters.resets.get(), 4);
    assert!((performance - 2.0).abs() < f32::EPSILON);
    assert_eq!(info.n_train_episodes, 4);
    assert_eq!(info.scores.len(), 4);
    assert!((info.scores.mean_sliding_scores() - performance).abs() < f32::EPSILON);
    Ok(())
}

#[test]
fn test_custom_termination_predicate_overrides_default() -> Result<()> {
    let (env, counters) = ScriptedEnv::new(
        vec![
            ScriptedBrain {
                name: "first",
                observation_type: ObservationType::Vector,
                n_agents: 1,
                done_after: 2,
            },
            ScriptedBrain {
                name: "second",
                observation_type: ObservationType::Vector,
                n_agents: 1,
                done_after: NEVER,
            },
        ],
        0.0,
    );
    let (first, _) = counting_brain("first", 1);
    let (second, _) = counting_brain("second", 1);
    let mut brain_set = BrainSet::new(vec![first, second])?;
    let mut simulator = simulator(env);

    // End the episode as soon as any agent reports done.
    let mut hooks = EpisodeHooks::default();
    hooks.end_episode_criteria_fn = Box::new(|dones: &[bool]| dones.iter().any(|d| *d));

    let config = TrainConfig::default().n_episodes(1).max_t(10);
    simulator.train(&mut brain_set, &config, &mut hooks, &mut NullRecorder {})?;

    assert_eq!(counters.steps.get(), 2);
    Ok(())
}
