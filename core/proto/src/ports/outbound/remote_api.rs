//! リモートストア API の Outbound ポート
//!
//! 不透明なユーザー ID でスコープされ、全ミューテーションは ID による
//! upsert（再試行しても重複レコードを作らない）。実装は
//! `adapter::HttpRemoteApi` やテスト用のメモリ実装など。

use crate::domain::{Checkin, Run, RunHistoryEntry, UserId};
use common::domain::RunId;
use common::error::Error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// リモートに保存されたユーザー状態のスナップショット
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteState {
    #[serde(default)]
    pub active_run: Option<Run>,
    #[serde(default)]
    pub history: Vec<RunHistoryEntry>,
}

/// リモートストアへの API 契約
pub trait RemoteApi: Send + Sync {
    /// ユーザーの active Run と履歴を取得する
    fn fetch_state(&self, user: &UserId) -> Result<RemoteState, Error>;

    /// active Run を upsert する
    fn put_active_run(&self, user: &UserId, run: &Run) -> Result<(), Error>;

    /// active Run を削除する（終了・リセット時）
    fn delete_active_run(&self, user: &UserId, run_id: &RunId) -> Result<(), Error>;

    /// チェックインを (run_id, index) で upsert する
    fn upsert_checkin(&self, user: &UserId, run_id: &RunId, checkin: &Checkin)
        -> Result<(), Error>;

    /// 履歴エントリを ID で upsert する
    fn upsert_history_entry(&self, user: &UserId, entry: &RunHistoryEntry) -> Result<(), Error>;
}

/// 生きた接続ハンドルの取得可否
///
/// 取得できなければストア選択はローカルへフォールバックする。
pub trait RemoteConnector: Send + Sync {
    fn connect(&self) -> Option<Arc<dyn RemoteApi>>;
}
