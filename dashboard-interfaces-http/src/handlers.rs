pub mod dashboard_handlers;
pub mod ops_handlers;

pub use dashboard_handlers::*;
pub use ops_handlers::*;
