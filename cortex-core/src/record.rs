//! Recording of per-episode metrics.
//!
//! The training and evaluation loops aggregate each episode into a
//! [`Record`] (episode index, episode score, windowed mean) and hand it to a
//! [`Recorder`]. [`NullRecorder`] discards everything, [`BufferedRecorder`]
//! keeps the stream in memory for inspection.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
