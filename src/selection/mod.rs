pub mod interpret;
pub mod selector;

pub use interpret::*;
pub use selector::*;
