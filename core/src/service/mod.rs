mod rotation;

pub use rotation::*;
