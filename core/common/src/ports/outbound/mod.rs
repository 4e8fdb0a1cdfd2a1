//! Outbound ポート（外界への依存の抽象）

mod clock;
mod env_resolver;
mod fs;
mod id_generator;
mod log;

pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use fs::{FileMetadata, FileSystem};
pub use id_generator::IdGenerator;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
