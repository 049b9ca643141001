pub mod ffprobe;
pub mod startup_self_check;
