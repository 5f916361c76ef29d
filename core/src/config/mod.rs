pub mod load;
pub mod types;

pub use load::{load, validate};
pub use types::*;
