pub mod coord;
pub mod value;

pub use coord::*;
pub use value::*;
