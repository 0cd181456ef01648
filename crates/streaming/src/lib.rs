pub mod fetch;
pub mod pending;
pub mod request;

pub use fetch::*;
pub use pending::*;
pub use request::*;
