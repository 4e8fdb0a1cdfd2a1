//! 標準アダプタ（Outbound ポートの std 実装）

mod file_json_log;
mod std_clock;
mod std_env_resolver;
mod std_fs;

pub use file_json_log::{FileJsonLog, NoopLog};
pub use std_clock::StdClock;
pub use std_env_resolver::StdEnvResolver;
pub use std_fs::StdFileSystem;
