#![warn(missing_docs)]
//! Cortex orchestrates episodic reinforcement-learning experiments against
//! simulated environments. It drives rollout loops over a set of
//! [`Brain`](cortex_core::Brain)s (named groups of agents sharing one
//! observation/action contract), feeds per-step transitions to pluggable
//! [`Agent`](cortex_core::Agent)s and tracks rolling performance scores to
//! decide when a task is solved.
//!
//! The workspace consists of the following crates:
//!
//! * [cortex-core](cortex_core) provides the base abstractions
//!   ([`Brain`](cortex_core::Brain), [`BrainSet`](cortex_core::BrainSet),
//!   [`Agent`](cortex_core::Agent), [`Env`](cortex_core::Env)), the episode
//!   loop engine ([`Simulator`](cortex_core::Simulator)) with its
//!   [`hooks`](cortex_core::hooks), the [`Scores`](cortex_core::Scores)
//!   tracker and the [`record`](cortex_core::record) utilities.
//! * `cortex` is the facade, collecting the examples and integration tests.
//!
//! The environment itself, the learning algorithms and their experience
//! buffers are external collaborators: environments implement
//! [`Env`](cortex_core::Env), learning algorithms implement
//! [`Agent`](cortex_core::Agent), and the loop stays agnostic to both.
pub use cortex_core as core;
