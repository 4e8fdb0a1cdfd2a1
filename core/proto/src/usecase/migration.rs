//! ローカル履歴のリモートへの一回限りの移行
//!
//! 認証済みかつ Pro になった最初の機会に一度だけ走る。コピーであって
//! 移動ではない（ローカルは残す）。途中で失敗したらフラグを立てずに
//! 全体を中断し、次の機会に最初からやり直す。リモート書き込みが
//! ID による upsert なので、やり直しても重複は生じない。

use crate::domain::{Checkin, CheckinResult, UserId};
use crate::ports::outbound::{FlagStore, RemoteApi, RunStore};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

/// 移行パスの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// フラグ済みのため何もしなかった
    AlreadyDone,
    /// ローカル履歴が空（フラグだけ立てた）
    NothingToMigrate,
    /// 移行した（Run 数とチェックイン数）
    Migrated { runs: usize, checkins: usize },
}

/// マイグレーションコーディネータ
pub struct MigrationUseCase {
    local: Arc<dyn RunStore>,
    flags: Arc<dyn FlagStore>,
    log: Arc<dyn Log>,
}

impl MigrationUseCase {
    pub fn new(local: Arc<dyn RunStore>, flags: Arc<dyn FlagStore>, log: Arc<dyn Log>) -> Self {
        Self { local, flags, log }
    }

    /// 必要ならローカル履歴をリモートへコピーする。
    ///
    /// 失敗は warn ログを残して返す。呼び出し側はユーザー向けエラーに
    /// しない（ローカルデータは無傷で使い続けられる）。
    pub fn migrate_if_needed(
        &self,
        api: &Arc<dyn RemoteApi>,
        user: &UserId,
    ) -> Result<MigrationOutcome, Error> {
        if self.flags.migration_done() {
            return Ok(MigrationOutcome::AlreadyDone);
        }

        self.local.hydrate()?;
        let history = self.local.run_history();
        if history.is_empty() {
            // 移行対象なし。ただし毎セッション再試行しないようフラグは立てる
            self.flags.set_migration_done()?;
            return Ok(MigrationOutcome::NothingToMigrate);
        }

        let mut checkins = 0usize;
        for entry in &history {
            if let Err(e) = api.upsert_history_entry(user, entry) {
                self.abort(&e, entry.id.as_str());
                return Err(e);
            }
            // 各 note から 1 件ずつチェックインを合成する（位置から連番を導出）
            for (i, note) in entry.notes.iter().filter(|n| !n.text.is_empty()).enumerate() {
                let checkin = Checkin {
                    index: i as u32 + 1,
                    result: CheckinResult::Clean,
                    note: Some(note.text.clone()),
                    created_at_ms: note
                        .date
                        .and_hms_opt(0, 0, 0)
                        .map(|dt| dt.and_utc().timestamp_millis() as u64)
                        .unwrap_or(entry.started_at_ms),
                    behaviour_ids: Vec::new(),
                };
                if let Err(e) = api.upsert_checkin(user, &entry.id, &checkin) {
                    self.abort(&e, entry.id.as_str());
                    return Err(e);
                }
                checkins += 1;
            }
        }

        self.flags.set_migration_done()?;
        let _ = self.log.log(
            &LogRecord::new(
                LogLevel::Info,
                "local history migrated to remote store",
                "usecase",
                "migration",
            )
            .with_field("runs", serde_json::json!(history.len()))
            .with_field("checkins", serde_json::json!(checkins)),
        );
        Ok(MigrationOutcome::Migrated {
            runs: history.len(),
            checkins,
        })
    }

    fn abort(&self, err: &Error, run_id: &str) {
        let _ = self.log.log(
            &LogRecord::new(
                LogLevel::Warn,
                format!("migration aborted, will retry next session: {}", err),
                "usecase",
                "migration",
            )
            .with_field("run_id", serde_json::json!(run_id)),
        );
    }
}
