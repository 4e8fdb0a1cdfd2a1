//! 共有ドメイン型

mod dirs;
mod run_id;

pub use dirs::Dirs;
pub use run_id::RunId;
