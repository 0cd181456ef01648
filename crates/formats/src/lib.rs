pub mod boundary_source;
pub mod statistics_source;

pub use boundary_source::*;
pub use statistics_source::*;
