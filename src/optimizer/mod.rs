pub mod builder;
pub mod constraints;
pub mod lp_format;
pub mod program;
pub mod strategies;
pub mod types;

pub use builder::*;
pub use constraints::{BigM, ConstraintFamily, DecisionVars};
pub use program::*;
pub use strategies::*;
pub use types::*;
