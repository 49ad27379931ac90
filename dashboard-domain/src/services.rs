// Pure data transformations behind every dashboard panel
pub mod anomaly_flagger;
pub mod compressor;
pub mod date_filter;
pub mod joiner;
pub mod plot_builder;
pub mod resampler;

pub use anomaly_flagger::*;
pub use compressor::*;
pub use date_filter::*;
pub use joiner::*;
pub use plot_builder::*;
pub use resampler::*;
