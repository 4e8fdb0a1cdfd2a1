//! Outbound ポート（ストレージ・リモート API の抽象）

mod flag_store;
mod remote_api;
mod run_store;

pub use flag_store::FlagStore;
pub use remote_api::{RemoteApi, RemoteConnector, RemoteState};
pub use run_store::RunStore;
