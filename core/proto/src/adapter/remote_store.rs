//! リモート（複数端末）Run ストア
//!
//! RemoteApi 経由の各ミューテーションは独立に失敗しうる。失敗時は
//! ローカルストアへ書き込んでデグレード動作を続け、warn ログを残す。
//! ユーザーの操作をリモート可用性でブロックしない（ベストエフォート、
//! 次回 hydrate で選択中のアダプタを正として再整合する）。
//!
//! 例外は `save_run`（マイグレーション経路）: 失敗を伝播し、
//! 呼び出し側が移行パス全体を中断できるようにする。

use crate::domain::{Checkin, Run, RunHistoryEntry, UserId};
use crate::ports::outbound::{RemoteApi, RunStore};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RemoteCache {
    active: Option<Run>,
    history: Vec<RunHistoryEntry>,
}

/// RemoteApi をラップし、失敗時にローカルへフォールバックする RunStore 実装
pub struct RemoteRunStore {
    api: Arc<dyn RemoteApi>,
    user: UserId,
    fallback: Arc<dyn RunStore>,
    log: Arc<dyn Log>,
    state: Mutex<RemoteCache>,
}

impl RemoteRunStore {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        user: UserId,
        fallback: Arc<dyn RunStore>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            api,
            user,
            fallback,
            log,
            state: Mutex::new(RemoteCache::default()),
        }
    }

    fn warn(&self, op: &str, err: &Error) {
        let _ = self.log.log(
            &LogRecord::new(
                LogLevel::Warn,
                format!("remote {} failed, falling back to local: {}", op, err),
                "adapter",
                "storage",
            )
            .with_field("user", serde_json::json!(self.user.as_str())),
        );
    }
}

impl RunStore for RemoteRunStore {
    fn hydrate(&self) -> Result<(), Error> {
        match self.api.fetch_state(&self.user) {
            Ok(remote) => {
                let active = remote.active_run.filter(|run| run.validate().is_ok());
                let history = remote
                    .history
                    .into_iter()
                    .filter(|e| e.validate().is_ok())
                    .collect();
                let mut state = self.state.lock().unwrap();
                state.active = active;
                state.history = history;
            }
            Err(e) => {
                self.warn("hydrate", &e);
                let mut state = self.state.lock().unwrap();
                state.active = None;
                state.history = Vec::new();
            }
        }
        Ok(())
    }

    fn active_run(&self) -> Option<Run> {
        self.state.lock().unwrap().active.clone()
    }

    fn run_history(&self) -> Vec<RunHistoryEntry> {
        self.state.lock().unwrap().history.clone()
    }

    fn start_run(&self, run: &Run) -> Result<(), Error> {
        self.state.lock().unwrap().active = Some(run.clone());
        if let Err(e) = self.api.put_active_run(&self.user, run) {
            self.warn("start_run", &e);
            self.fallback.start_run(run)?;
        }
        Ok(())
    }

    fn add_checkin(&self, run: &Run, checkin: &Checkin) -> Result<(), Error> {
        self.state.lock().unwrap().active = Some(run.clone());
        if let Err(e) = self.api.upsert_checkin(&self.user, &run.id, checkin) {
            self.warn("add_checkin", &e);
            self.fallback.add_checkin(run, checkin)?;
        }
        Ok(())
    }

    fn end_run(&self, run: &Run, entry: &RunHistoryEntry) -> Result<(), Error> {
        {
            let mut state = self.state.lock().unwrap();
            state.active = None;
            state.history.insert(0, entry.clone());
        }
        let result = self
            .api
            .upsert_history_entry(&self.user, entry)
            .and_then(|_| self.api.delete_active_run(&self.user, &run.id));
        if let Err(e) = result {
            self.warn("end_run", &e);
            self.fallback.end_run(run, entry)?;
        }
        Ok(())
    }

    fn save_run(&self, entry: &RunHistoryEntry) -> Result<(), Error> {
        // マイグレーション経路: フォールバックせず失敗を返す
        self.api.upsert_history_entry(&self.user, entry)?;
        let mut state = self.state.lock().unwrap();
        match state.history.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => state.history.insert(0, entry.clone()),
        }
        Ok(())
    }

    fn clear_active(&self) -> Result<(), Error> {
        let run_id = {
            let mut state = self.state.lock().unwrap();
            let id = state.active.as_ref().map(|r| r.id.clone());
            state.active = None;
            id
        };
        if let Some(id) = run_id {
            if let Err(e) = self.api.delete_active_run(&self.user, &id) {
                self.warn("clear_active", &e);
                self.fallback.clear_active()?;
            }
        }
        Ok(())
    }

    fn clear_local_app_keys(&self) -> Result<(), Error> {
        // リモートデータは暗黙に消さない
        Ok(())
    }
}
