pub mod error;
pub mod graph;
pub mod instance;

pub use error::*;
pub use graph::*;
pub use instance::*;
