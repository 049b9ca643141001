mod handle;
mod message;
mod registry;

pub use handle::*;
pub use message::*;
pub use registry::*;
