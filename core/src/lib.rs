pub mod channel;
pub mod config;
pub mod model;
mod processing;
pub mod service;
pub mod util;

pub use processing::ffprobe;
pub use processing::startup_self_check;
