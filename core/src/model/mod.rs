mod rotation;
mod video_reference;
pub use rotation::*;
pub use video_reference::*;
