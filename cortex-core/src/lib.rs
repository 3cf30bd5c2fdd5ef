#![warn(missing_docs)]
//! Core components for orchestrating episodic reinforcement-learning
//! experiments against simulated environments.
pub mod error;
pub mod record;

mod base;
pub use base::{
    Action, Agent, Brain, BrainActions, BrainConfig, BrainInfo, BrainSet, BrainStates, Env,
    EnvResponse, Mode, ObservationType, PreprocessFn, RawBrainActions, StepResult, StepResults,
};

mod scores;
pub use scores::Scores;

mod simulator;
pub use simulator::{
    hooks, EpisodeHooks, EvalConfig, EvalReport, PerformanceConfig, PerformanceInfo, Simulator,
    SimulatorConfig, TrainConfig, TrainReport, WarmupConfig,
};
