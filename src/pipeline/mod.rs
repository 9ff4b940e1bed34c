//! Training pipeline abstractions
//!
//! This module provides composable pipelines for:
//! - Running an agent against an environment episode by episode
//! - Training a chatbot over its corpus and teaching it new pairs
//! - Recording observations during training

pub mod observers;
pub mod training;

pub use observers::{CsvObserver, MetricsObserver, MetricsSummary, ProgressObserver, ReportObserver};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;
