//! ストア選択ポリシー
//!
//! リモートを使うのは「認証済み ∧ Pro ∧ 接続ハンドルが取得できた」とき
//! だけ。それ以外は常にローカル。認証済みでも非 Pro ならローカルに留め、
//! エンタイトルメント境界を UI ではなくストレージ層で守る。

use crate::adapter::RemoteRunStore;
use crate::domain::Account;
use crate::ports::outbound::{RemoteApi, RemoteConnector, RunStore};
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

/// 選択結果。リモートが選ばれた場合は API ハンドルも返す
/// （マイグレーションが同じ接続を使うため）。
pub struct StoreSelection {
    pub store: Arc<dyn RunStore>,
    pub remote: Option<Arc<dyn RemoteApi>>,
}

/// アカウント状態と接続可否からストアを選ぶ
pub fn select_store(
    account: &Account,
    local: Arc<dyn RunStore>,
    connector: &dyn RemoteConnector,
    log: Arc<dyn Log>,
) -> StoreSelection {
    if let (true, Some(user)) = (account.remote_eligible(), account.user_id.clone()) {
        if let Some(api) = connector.connect() {
            let store = Arc::new(RemoteRunStore::new(
                Arc::clone(&api),
                user,
                local,
                Arc::clone(&log),
            ));
            return StoreSelection {
                store,
                remote: Some(api),
            };
        }
        let _ = log.log(&LogRecord::new(
            LogLevel::Warn,
            "remote store eligible but no connection handle, using local store",
            "adapter",
            "storage",
        ));
    }
    StoreSelection {
        store: local,
        remote: None,
    }
}
