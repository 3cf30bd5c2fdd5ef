//! Configuration of [`Simulator`](super::Simulator) runs.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of a [`Simulator`](super::Simulator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SimulatorConfig {
    /// Name of the task being driven, used in logging.
    pub task_name: String,

    /// Random seed, applied once at simulator construction.
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            task_name: "default".to_string(),
            seed: 0,
        }
    }
}

impl SimulatorConfig {
    /// Sets the task name.
    pub fn task_name(mut self, v: impl Into<String>) -> Self {
        self.task_name = v.into();
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`SimulatorConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SimulatorConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of a training run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainConfig {
    /// The number of episodes to train over.
    pub n_episodes: usize,

    /// The maximum number of timesteps allowed in each episode.
    pub max_t: usize,

    /// Windowed mean required to mark the task as solved and stop early.
    ///
    /// `None` disables the solved check; the run uses all episodes.
    pub solved_score: Option<f32>,

    /// The number of historical scores the sliding window averages over.
    pub sliding_window_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_episodes: 2000,
            max_t: 1000,
            solved_score: None,
            sliding_window_size: 100,
        }
    }
}

impl TrainConfig {
    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the step budget per episode.
    pub fn max_t(mut self, v: usize) -> Self {
        self.max_t = v;
        self
    }

    /// Sets the solved score.
    pub fn solved_score(mut self, v: f32) -> Self {
        self.solved_score = Some(v);
        self
    }

    /// Sets the sliding window size.
    pub fn sliding_window_size(mut self, v: usize) -> Self {
        self.sliding_window_size = v;
        self
    }

    /// Constructs [`TrainConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of an evaluation run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EvalConfig {
    /// The number of evaluation episodes.
    pub n_episodes: usize,

    /// The maximum number of timesteps allowed in each episode.
    pub max_t: usize,

    /// The number of historical scores the sliding window averages over.
    pub sliding_window_size: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            n_episodes: 5,
            max_t: 1000,
            sliding_window_size: 100,
        }
    }
}

impl EvalConfig {
    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the step budget per episode.
    pub fn max_t(mut self, v: usize) -> Self {
        self.max_t = v;
        self
    }

    /// Sets the sliding window size.
    pub fn sliding_window_size(mut self, v: usize) -> Self {
        self.sliding_window_size = v;
        self
    }

    /// Constructs [`EvalConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvalConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of a warmup run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct WarmupConfig {
    /// The number of warmup episodes.
    pub n_episodes: usize,

    /// The maximum number of timesteps allowed in each episode.
    pub max_t: usize,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            n_episodes: 10,
            max_t: 1000,
        }
    }
}

impl WarmupConfig {
    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the step budget per episode.
    pub fn max_t(mut self, v: usize) -> Self {
        self.max_t = v;
        self
    }

    /// Constructs [`WarmupConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`WarmupConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of a performance measurement.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PerformanceConfig {
    /// The number of episodes to train over.
    pub n_train_episodes: usize,

    /// The maximum number of timesteps allowed in each episode.
    pub max_t: usize,

    /// The number of historical scores the sliding window averages over.
    pub sliding_window_size: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            n_train_episodes: 100,
            max_t: 1000,
            sliding_window_size: 100,
        }
    }
}

impl PerformanceConfig {
    /// Sets the number of training episodes.
    pub fn n_train_episodes(mut self, v: usize) -> Self {
        self.n_train_episodes = v;
        self
    }

    /// Sets the step budget per episode.
    pub fn max_t(mut self, v: usize) -> Self {
        self.max_t = v;
        self
    }

    /// Sets the sliding window size.
    pub fn sliding_window_size(mut self, v: usize) -> Self {
        self.sliding_window_size = v;
        self
    }
}
