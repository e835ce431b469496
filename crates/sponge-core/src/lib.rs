pub mod config;
pub mod engine;
pub mod errors;
pub mod evaluators;
pub mod fingerprint;
pub mod metrics_api;
pub mod model;
pub mod normalize;
pub mod overlay;
pub mod providers;
pub mod report;
pub mod sandbox;
