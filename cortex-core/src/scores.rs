//! Episode score tracking.
use std::collections::VecDeque;

/// Episode-level score history with a bounded sliding window.
///
/// [`add`](Scores::add) appends to the full history and to a FIFO window of
/// at most `window_size` entries, evicting the oldest entry at capacity. The
/// windowed mean is the solve/stop criterion of the training loop.
///
/// A tracker is created at the start of each training or evaluation run and
/// replaced at the start of the next one.
#[derive(Clone, Debug)]
pub struct Scores {
    history: Vec<f32>,
    window: VecDeque<f32>,
    window_size: usize,
}

impl Scores {
    /// Creates an empty tracker with the given window capacity.
    pub fn new(window_size: usize) -> Self {
        Self {
            history: Vec::new(),
            window: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Records one episode score.
    pub fn add(&mut self, score: f32) {
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(score);
        self.history.push(score);
    }

    /// Mean of the sliding window.
    ///
    /// Returns `0.0` when nothing has been recorded yet.
    pub fn mean_sliding_scores(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f32>() / self.window.len() as f32
    }

    /// Mean of the full history.
    ///
    /// Returns `0.0` when nothing has been recorded yet.
    pub fn mean(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    /// Number of scores recorded.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns `true` if no score has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The most recently recorded score.
    pub fn last(&self) -> Option<f32> {
        self.history.last().copied()
    }

    /// All recorded scores in recording order.
    pub fn history(&self) -> &[f32] {
        &self.history
    }

    /// Contents of the sliding window, oldest first.
    pub fn window(&self) -> impl Iterator<Item = f32> + '_ {
        self.window.iter().copied()
    }

    /// Capacity of the sliding window.
    pub fn window_size(&self) -> usize {
        self.window_size
    }
}
