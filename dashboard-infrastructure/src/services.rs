pub mod chart_svg;
pub mod health_service;
pub mod report_service;

pub use chart_svg::*;
pub use health_service::*;
pub use report_service::*;
