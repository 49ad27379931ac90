// Dashboard Application Layer

pub mod error;
pub mod layouts;
pub mod metrics;
pub mod panels;
pub mod queries;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use error::AppError;
pub use layouts::LayoutCatalog;
pub use metrics::Metrics;
pub use state::AppState;
