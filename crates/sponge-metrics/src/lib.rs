use sponge_core::config::Vocabulary;
use sponge_core::metrics_api::Aggregator;
use std::sync::Arc;

pub mod badge;
pub mod code_quality;
pub mod communication;
pub mod headline;
pub mod insights;
pub mod interpretation;
pub mod penalties;
pub mod problem_solving;
pub mod rubric;
pub mod signals;
pub mod verification;
pub mod vocabulary;

pub use rubric::RubricAggregator;

pub fn default_aggregator(vocabulary: &Vocabulary) -> Arc<dyn Aggregator> {
    Arc::new(RubricAggregator::new(vocabulary))
}
