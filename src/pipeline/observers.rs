//! Observer implementations for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{fs::File, io::BufWriter, path::Path};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Error, Result,
    ports::{EpisodeSummary, GrowthEvent, Observer},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self { progress_bar: None }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64);
            pb.set_message(format!(
                "acc {:.1}% ε {:.3}",
                summary.accuracy() * 100.0,
                summary.epsilon
            ));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish();
        }
        Ok(())
    }
}

/// Report observer - Logs a summary line every `every` episodes
pub struct ReportObserver {
    every: usize,
    successes: usize,
    steps: usize,
    total_reward: f64,
}

impl ReportObserver {
    /// Report every `every` episodes; 0 disables reporting.
    pub fn new(every: usize) -> Self {
        Self {
            every,
            successes: 0,
            steps: 0,
            total_reward: 0.0,
        }
    }
}

impl Observer for ReportObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.successes += summary.successes;
        self.steps += summary.steps;
        self.total_reward += summary.total_reward;

        if self.every > 0 && summary.episode % self.every == 0 {
            let (accuracy, mean_reward) = if self.steps == 0 {
                (0.0, 0.0)
            } else {
                (
                    self.successes as f64 / self.steps as f64,
                    self.total_reward / self.steps as f64,
                )
            };
            info!(
                episode = summary.episode,
                accuracy = %format!("{:.1}%", accuracy * 100.0),
                mean_reward = %format!("{mean_reward:.3}"),
                epsilon = %format!("{:.4}", summary.epsilon),
                "Training progress"
            );
            self.successes = 0;
            self.steps = 0;
            self.total_reward = 0.0;
        }
        Ok(())
    }

    fn on_growth(&mut self, event: &GrowthEvent) -> Result<()> {
        info!(
            label = %event.label,
            actions = event.action_count,
            strategy = %event.strategy,
            replayed = event.replayed_pairs,
            "Action space grew"
        );
        Ok(())
    }
}

/// Metrics observer - Keeps every episode summary in memory
#[derive(Default)]
pub struct MetricsObserver {
    episodes: Vec<EpisodeSummary>,
    growth_events: Vec<GrowthEvent>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episodes(&self) -> &[EpisodeSummary] {
        &self.episodes
    }

    pub fn growth_events(&self) -> &[GrowthEvent] {
        &self.growth_events
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let episodes = self.episodes.len();
        let steps: usize = self.episodes.iter().map(|e| e.steps).sum();
        let successes: usize = self.episodes.iter().map(|e| e.successes).sum();
        let total_reward: f64 = self.episodes.iter().map(|e| e.total_reward).sum();
        MetricsSummary {
            episodes,
            steps,
            successes,
            accuracy: if steps == 0 {
                0.0
            } else {
                successes as f64 / steps as f64
            },
            mean_episode_reward: if episodes == 0 {
                0.0
            } else {
                total_reward / episodes as f64
            },
            final_epsilon: self.episodes.last().map(|e| e.epsilon),
            growth_events: self.growth_events.len(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub steps: usize,
    pub successes: usize,
    pub accuracy: f64,
    pub mean_episode_reward: f64,
    pub final_epsilon: Option<f64>,
    pub growth_events: usize,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes.push(summary.clone());
        Ok(())
    }

    fn on_growth(&mut self, event: &GrowthEvent) -> Result<()> {
        self.growth_events.push(event.clone());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CsvRow {
    episode: usize,
    steps: usize,
    successes: usize,
    accuracy: f64,
    total_reward: f64,
    epsilon: f64,
}

/// CSV observer - Writes one row per episode
pub struct CsvObserver {
    writer: csv::Writer<BufWriter<File>>,
}

impl CsvObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create metrics file {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: csv::Writer::from_writer(BufWriter::new(file)),
        })
    }
}

impl Observer for CsvObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.writer.serialize(CsvRow {
            episode: summary.episode,
            steps: summary.steps,
            successes: summary.successes,
            accuracy: summary.accuracy(),
            total_reward: summary.total_reward,
            epsilon: summary.epsilon,
        })?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(episode: usize, successes: usize) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            steps: 4,
            successes,
            total_reward: successes as f64 * 10.0,
            epsilon: 0.5,
        }
    }

    #[test]
    fn test_metrics_summary() {
        let mut observer = MetricsObserver::new();
        observer.on_episode_end(&summary(1, 1)).unwrap();
        observer.on_episode_end(&summary(2, 3)).unwrap();

        let metrics = observer.summary();
        assert_eq!(metrics.episodes, 2);
        assert_eq!(metrics.steps, 8);
        assert_eq!(metrics.accuracy, 0.5);
        assert_eq!(metrics.mean_episode_reward, 20.0);
        assert_eq!(metrics.final_epsilon, Some(0.5));
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = MetricsObserver::new().summary();
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.final_epsilon, None);
    }

    #[test]
    fn test_csv_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metrics.csv");
        let mut observer = CsvObserver::new(&path).unwrap();
        observer.on_episode_end(&summary(1, 2)).unwrap();
        observer.on_episode_end(&summary(2, 4)).unwrap();
        observer.on_training_end().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "episode,steps,successes,accuracy,total_reward,epsilon");
        assert!(lines[2].starts_with("2,4,4,1.0,40.0,0.5"));
    }
}
