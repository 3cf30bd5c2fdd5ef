//! Actions.
use ndarray::Array1;

/// An action selected by an [`Agent`](super::Agent) for a single state.
///
/// The loop never inspects the value; the action-conversion hook turns a
/// brain's actions into the raw numeric block the environment expects.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// A single choice out of the brain's `action_size` alternatives.
    Discrete(i64),

    /// A vector of control values, one per action dimension.
    Continuous(Array1<f32>),
}

impl Action {
    /// Number of numeric elements the action occupies in a raw action row.
    pub fn len(&self) -> usize {
        match self {
            Action::Discrete(_) => 1,
            Action::Continuous(v) => v.len(),
        }
    }

    /// Returns `true` if the action carries no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The numeric row used by the default conversion into environment actions.
    pub fn as_row(&self) -> Array1<f32> {
        match self {
            Action::Discrete(a) => Array1::from(vec![*a as f32]),
            Action::Continuous(v) => v.clone(),
        }
    }
}
