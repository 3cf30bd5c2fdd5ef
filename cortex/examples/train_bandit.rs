//! Trains a value-tracking agent on a two-armed bandit until solved.
//!
//! The bandit is the smallest environment exercising the full loop: episodes
//! are one step long, the reward depends on the chosen arm and the agent
//! learns arm values from the step notifications alone.
use anyhow::Result;
use cortex::core::{
    record::NullRecorder, Action, Agent, Brain, BrainConfig, BrainInfo, BrainSet, Env,
    EnvResponse, EpisodeHooks, EvalConfig, Mode, ObservationType, RawBrainActions, Simulator,
    SimulatorConfig, StepResult, TrainConfig,
};
use ndarray::{ArrayD, ArrayViewD};

const BRAIN_NAME: &str = "BanditBrain";
const N_ARMS: usize = 2;
const ARM_PROBS: [f32; N_ARMS] = [0.2, 0.8];
const SOLVED_SCORE: f32 = 0.7;

struct BanditEnv {
    last_arm: usize,
}

impl BanditEnv {
    fn response(&self, initial: bool) -> EnvResponse {
        let obs = ArrayD::zeros(vec![1, 1]);
        let reward = if !initial && fastrand::f32() < ARM_PROBS[self.last_arm] {
            1.0
        } else {
            0.0
        };
        let mut response = EnvResponse::new();
        response.insert(
            BRAIN_NAME.to_string(),
            BrainInfo::vector(obs, vec![reward], vec![!initial]),
        );
        response
    }
}

impl Env for BanditEnv {
    fn reset(&mut self, _train_mode: bool) -> Result<EnvResponse> {
        Ok(self.response(true))
    }

    fn step(&mut self, actions: &RawBrainActions) -> Result<EnvResponse> {
        self.last_arm = actions[BRAIN_NAME][[0, 0]] as usize;
        Ok(self.response(false))
    }
}

/// Epsilon-greedy agent tracking a running mean reward per arm.
struct ValueAgent {
    values: [f32; N_ARMS],
    counts: [u32; N_ARMS],
    epsilon: f32,
    mode: Mode,
}

impl ValueAgent {
    fn new() -> Self {
        Self {
            values: [0.0; N_ARMS],
            counts: [0; N_ARMS],
            epsilon: 1.0,
            mode: Mode::Train,
        }
    }

    fn greedy_arm(&self) -> usize {
        if self.values[1] > self.values[0] {
            1
        } else {
            0
        }
    }
}

impl Agent for ValueAgent {
    fn act(&mut self, _state: ArrayViewD<f32>) -> Action {
        if self.mode == Mode::Train && fastrand::f32() < self.epsilon {
            self.random_action()
        } else {
            Action::Discrete(self.greedy_arm() as i64)
        }
    }

    fn random_action(&mut self) -> Action {
        Action::Discrete(fastrand::usize(0..N_ARMS) as i64)
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn set_warmup(&mut self, _warmup: bool) {}

    fn observe_step(&mut self, step: &StepResult, i: usize, _t: usize) {
        if self.mode == Mode::Eval {
            return;
        }
        if let Some(Action::Discrete(arm)) = step.actions.get(i) {
            let arm = *arm as usize;
            self.counts[arm] += 1;
            let reward = step.rewards[i];
            self.values[arm] += (reward - self.values[arm]) / self.counts[arm] as f32;
        }
    }

    fn end_episode(&mut self, _i_episode: usize) {
        self.epsilon = (self.epsilon * 0.995).max(0.01);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = BrainConfig::new(BRAIN_NAME)
        .action_size(N_ARMS)
        .state_shape(&[1])
        .observation_type(ObservationType::Vector);
    let agents: Vec<Box<dyn Agent>> = vec![Box::new(ValueAgent::new())];
    let mut brain_set = BrainSet::new(vec![Brain::new(config, agents)])?;

    let mut simulator = Simulator::build(
        SimulatorConfig::default().task_name("bandit").seed(7),
        BanditEnv { last_arm: 0 },
    );
    let mut hooks = EpisodeHooks::default();

    let report = simulator.train(
        &mut brain_set,
        &TrainConfig::default()
            .n_episodes(2000)
            .max_t(1)
            .solved_score(SOLVED_SCORE),
        &mut hooks,
        &mut NullRecorder {},
    )?;
    println!(
        "Training finished after {} episodes in {:.1}s",
        report.i_episode,
        report.elapsed.as_secs_f64()
    );

    let eval = simulator.evaluate(
        &mut brain_set,
        &EvalConfig::default().n_episodes(100).max_t(1),
        &mut hooks,
        &mut NullRecorder {},
    )?;
    println!("Average evaluation score: {:.2}", eval.average_score);

    simulator.close()
}
