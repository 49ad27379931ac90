// Domain value objects
pub mod agg_op;
pub mod bucket_width;
pub mod chart_kind;

pub use agg_op::*;
pub use bucket_width::*;
pub use chart_kind::*;
