//! アダプタ（Outbound ポートの実装）

mod account;
mod flags;
mod http_api;
mod local_store;
mod remote_store;
mod store_select;

pub use account::load_account;
pub use flags::FileFlagStore;
pub use http_api::{HttpRemoteApi, HttpRemoteConnector};
pub use local_store::FileRunStore;
pub use remote_store::RemoteRunStore;
pub use store_select::{select_store, StoreSelection};
