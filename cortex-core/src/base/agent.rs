//! Agent.
use super::{Action, StepResult};
use ndarray::ArrayViewD;

/// Mode of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Learning enabled.
    Train,

    /// Learning disabled.
    Eval,
}

/// A pluggable learning/decision-making unit belonging to a
/// [`Brain`](super::Brain).
///
/// The simulation loop drives agents exclusively through this trait and is
/// agnostic to the learning algorithm behind it. Concrete agents own their
/// models, optimizers and experience buffers; the loop only asks for actions
/// and delivers notifications.
pub trait Agent {
    /// Selects an action for the given state row, respecting the current mode.
    fn act(&mut self, state: ArrayViewD<f32>) -> Action;

    /// Returns an exploration action, irrespective of the policy.
    ///
    /// Only called during warmup.
    fn random_action(&mut self) -> Action;

    /// Switches between training and evaluation mode.
    fn set_mode(&mut self, mode: Mode);

    /// Sets the warmup flag.
    fn set_warmup(&mut self, warmup: bool);

    /// Post-step notification with the brain's transition of this step.
    ///
    /// `i` is the agent's row within the brain, `t` the timestep within the
    /// episode. Learning agents typically store the transition into their
    /// experience buffer here and trigger an optimization step.
    fn observe_step(&mut self, _step: &StepResult, _i: usize, _t: usize) {}

    /// Post-episode notification.
    ///
    /// Learning agents typically decay exploration noise or step their
    /// schedules here.
    fn end_episode(&mut self, _i_episode: usize) {}
}
