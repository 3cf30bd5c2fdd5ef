//! Core abstractions of the simulation-training loop.
mod act;
mod agent;
mod brain;
mod brain_set;
mod env;
mod step;
pub use act::Action;
pub use agent::{Agent, Mode};
pub use brain::{Brain, BrainConfig, ObservationType, PreprocessFn};
pub use brain_set::{BrainActions, BrainSet, BrainStates};
pub use env::{BrainInfo, Env, EnvResponse, RawBrainActions};
pub use step::{StepResult, StepResults};
