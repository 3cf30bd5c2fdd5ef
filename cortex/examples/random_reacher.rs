//! Drives a reacher-like stub environment with random-action agents.
use anyhow::Result;
use cortex::core::{
    record::NullRecorder, Action, Agent, Brain, BrainConfig, BrainInfo, BrainSet, Env,
    EnvResponse, EpisodeHooks, EvalConfig, Mode, RawBrainActions, Simulator, SimulatorConfig,
    WarmupConfig,
};
use ndarray::{Array1, ArrayD, ArrayViewD};

const BRAIN_NAME: &str = "ReacherBrain";
const N_AGENTS: usize = 20;
const STATE_SIZE: usize = 33;
const ACTION_SIZE: usize = 4;
const EPISODE_LENGTH: usize = 50;

/// A stand-in for the 3D physics simulator: noisy observations, a small
/// random reward per step, episodes of fixed length.
struct StubReacherEnv {
    t: usize,
}

impl StubReacherEnv {
    fn response(&self, initial: bool) -> EnvResponse {
        let obs = ArrayD::from_shape_fn(vec![N_AGENTS, STATE_SIZE], |_| fastrand::f64() * 2.0 - 1.0);
        let rewards = if initial {
            vec![0.0; N_AGENTS]
        } else {
            (0..N_AGENTS).map(|_| 0.1 * fastrand::f32()).collect()
        };
        let done = !initial && self.t >= EPISODE_LENGTH;
        let mut response = EnvResponse::new();
        response.insert(
            BRAIN_NAME.to_string(),
            BrainInfo::vector(obs, rewards, vec![done; N_AGENTS]),
        );
        response
    }
}

impl Env for StubReacherEnv {
    fn reset(&mut self, _train_mode: bool) -> Result<EnvResponse> {
        self.t = 0;
        Ok(self.response(true))
    }

    fn step(&mut self, _actions: &RawBrainActions) -> Result<EnvResponse> {
        self.t += 1;
        Ok(self.response(false))
    }
}

struct RandomAgent {}

impl Agent for RandomAgent {
    fn act(&mut self, _state: ArrayViewD<f32>) -> Action {
        self.random_action()
    }

    fn random_action(&mut self) -> Action {
        Action::Continuous(Array1::from_shape_fn(ACTION_SIZE, |_| {
            fastrand::f32() * 2.0 - 1.0
        }))
    }

    fn set_mode(&mut self, _mode: Mode) {}

    fn set_warmup(&mut self, _warmup: bool) {}
}

fn main() -> Result<()> {
    env_logger::init();

    let agents: Vec<Box<dyn Agent>> = (0..N_AGENTS)
        .map(|_| Box::new(RandomAgent {}) as Box<dyn Agent>)
        .collect();
    let config = BrainConfig::new(BRAIN_NAME)
        .action_size(ACTION_SIZE)
        .state_shape(&[STATE_SIZE]);
    let mut brain_set = BrainSet::new(vec![Brain::new(config, agents)])?;

    let mut simulator = Simulator::build(
        SimulatorConfig::default().task_name("reacher").seed(42),
        StubReacherEnv { t: 0 },
    );
    let mut hooks = EpisodeHooks::default();

    simulator.warmup(
        &mut brain_set,
        &WarmupConfig::default().n_episodes(2).max_t(EPISODE_LENGTH),
        &mut hooks,
    )?;

    let report = simulator.evaluate(
        &mut brain_set,
        &EvalConfig::default().n_episodes(3).max_t(EPISODE_LENGTH),
        &mut hooks,
        &mut NullRecorder {},
    )?;
    println!("Average score over evaluation: {:.2}", report.average_score);

    simulator.close()
}
