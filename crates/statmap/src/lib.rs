pub mod batch;
pub mod cleaner;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod levels;
pub mod material;
pub mod morph;
pub mod normalizer;
pub mod render;
pub mod selection;
pub mod symbology;

pub use engine::*;
pub use error::*;
