// Domain entities
pub mod aggregate;
pub mod anomaly;
pub mod chart;
pub mod dashboard;
pub mod layout;
pub mod model;
pub mod table;
pub mod time_series;

pub use aggregate::*;
pub use anomaly::*;
pub use chart::*;
pub use dashboard::*;
pub use layout::*;
pub use model::*;
pub use table::*;
pub use time_series::*;
