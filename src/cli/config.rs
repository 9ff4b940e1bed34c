//! Shared configuration for CLI commands

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    app::AgentConfig,
    approximator::NetworkConfig,
    pipeline::{CsvObserver, ProgressObserver, ReportObserver, TrainingConfig, TrainingPipeline},
};

const DEFAULT_GAMMA: f64 = 0.99;
const DEFAULT_EPSILON_DECAY: f64 = 0.995;

/// Network and training knobs every command accepts.
///
/// Options left unset fall back to the defaults of the command at hand.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Discount factor in [0, 1)
    #[arg(long, default_value_t = DEFAULT_GAMMA)]
    pub gamma: f64,

    /// Multiplicative epsilon decay per learning step, in (0, 1)
    #[arg(long, default_value_t = DEFAULT_EPSILON_DECAY)]
    pub epsilon_decay: f64,

    /// Adam step size
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Hidden layer widths, comma separated (e.g. `64,32`)
    #[arg(long, value_delimiter = ',')]
    pub hidden: Option<Vec<usize>>,

    /// Episodes between progress reports (0 = never)
    #[arg(long, default_value_t = 20)]
    pub report_every: usize,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

/// Per-command fallbacks for [`CommonArgs`].
#[derive(Debug, Clone)]
pub struct CommandDefaults {
    pub episodes: usize,
    pub hidden: Vec<usize>,
    pub learning_rate: f64,
}

impl CommonArgs {
    /// Whether any option shaping the agent or network departs from its default.
    pub fn sets_model_options(&self) -> bool {
        self.gamma != DEFAULT_GAMMA
            || self.epsilon_decay != DEFAULT_EPSILON_DECAY
            || self.learning_rate.is_some()
            || self.hidden.is_some()
    }

    pub fn agent_config(&self) -> Result<AgentConfig> {
        let mut config = AgentConfig::new()
            .with_gamma(self.gamma)
            .with_epsilon_decay(self.epsilon_decay);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate().context("Invalid agent options")?;
        Ok(config)
    }

    pub fn network_config(&self, defaults: &CommandDefaults) -> Result<NetworkConfig> {
        let mut network = NetworkConfig::new(
            self.hidden.clone().unwrap_or_else(|| defaults.hidden.clone()),
            self.learning_rate.unwrap_or(defaults.learning_rate),
        );
        if let Some(seed) = self.seed {
            network = network.with_seed(seed);
        }
        network.validate().context("Invalid network options")?;
        Ok(network)
    }

    pub fn training_config(&self, defaults: &CommandDefaults) -> TrainingConfig {
        TrainingConfig::new(self.episodes.unwrap_or(defaults.episodes))
            .with_report_every(self.report_every)
    }

    /// Pipeline with the reporting observers these options ask for.
    pub fn pipeline(
        &self,
        defaults: &CommandDefaults,
        metrics_csv: Option<&Path>,
    ) -> Result<TrainingPipeline> {
        let config = self.training_config(defaults);
        let mut pipeline = TrainingPipeline::new(config.clone())
            .with_observer(Box::new(ReportObserver::new(config.report_every)));
        if self.progress {
            pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
        }
        if let Some(path) = metrics_csv {
            let observer = CsvObserver::new(path)
                .with_context(|| format!("Failed to create metrics file {}", path.display()))?;
            pipeline = pipeline.with_observer(Box::new(observer));
        }
        Ok(pipeline)
    }
}
