pub mod csv_datasets;
pub mod layout_files;

pub use csv_datasets::*;
pub use layout_files::*;
