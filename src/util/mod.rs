pub mod logging;
pub mod piper_path;
