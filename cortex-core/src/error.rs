//! Errors in the library.
use crate::ObservationType;
use thiserror::Error;

/// Errors in the library.
///
/// Environment faults are not represented here; they propagate unchanged
/// through [`anyhow::Error`] from the environment boundary.
#[derive(Error, Debug)]
pub enum CortexError {
    /// A brain was configured with an observation type the simulator does not know.
    #[error("invalid observation type: {0}")]
    InvalidObservationType(String),

    /// Two brains in one set share a name.
    #[error("duplicate brain name: {0}")]
    DuplicateBrainName(String),

    /// The environment response carries no payload for the named brain.
    #[error("environment response has no payload for brain: {0}")]
    MissingBrain(String),

    /// The payload does not carry the observation block the brain reads.
    #[error("no {kind} observations for brain: {brain}")]
    MissingObservations {
        /// Name of the brain whose observations are missing.
        brain: String,
        /// The observation block the brain asked for.
        kind: ObservationType,
    },

    /// States were requested before the environment was reset.
    #[error("environment has not been reset")]
    NotReset,

    /// Record key error.
    #[error("record key error: {0}")]
    RecordKey(String),

    /// Record value type error.
    #[error("record value type error: {0}")]
    RecordValueType(String),
}
