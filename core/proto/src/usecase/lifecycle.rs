//! Run ライフサイクルのユースケース（状態機械の唯一の書き手）
//!
//! 状態: idle →（start_run）→ active →（checkin/end）→ 終了。
//! 終了状態からは entitlement を満たせば再び start_run できる。
//! 「active な Run は同時に最大 1 つ」はここで強制する（ストレージではなく）。

use crate::domain::{
    current_streak, date_of_ms, find_behaviour, find_protocol, normalize_note,
    periods_from_checkins, best_run as best_run_of, Account, Checkin, CheckinResult, EndReason,
    LifecycleError, Run, RunHistoryEntry, DEFAULT_RUN_LENGTH, MAX_OBSERVED_BEHAVIOURS,
};
use crate::ports::outbound::{FlagStore, RunStore};
use common::domain::RunId;
use common::error::Error;
use common::ports::outbound::{Clock, IdGenerator, Log, LogLevel, LogRecord};
use std::sync::Arc;

/// end_run の結果。既にアーカイブ済みの Run への再実行は成功扱いで区別する
/// （部分的なネットワーク失敗後の正当な再試行のため）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    Ended(RunHistoryEntry),
    AlreadyEnded,
}

/// Run ライフサイクルのユースケース
pub struct LifecycleUseCase {
    store: Arc<dyn RunStore>,
    flags: Arc<dyn FlagStore>,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGenerator>,
    log: Arc<dyn Log>,
    account: Account,
}

impl LifecycleUseCase {
    pub fn new(
        store: Arc<dyn RunStore>,
        flags: Arc<dyn FlagStore>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGenerator>,
        log: Arc<dyn Log>,
        account: Account,
    ) -> Self {
        Self {
            store,
            flags,
            clock,
            id_gen,
            log,
            account,
        }
    }

    /// 永続状態をメモリへ展開する（コマンド実行前に一度呼ぶ）
    pub fn hydrate(&self) -> Result<(), Error> {
        self.store.hydrate()
    }

    pub fn active_run(&self) -> Option<Run> {
        self.store.active_run()
    }

    pub fn run_history(&self) -> Vec<RunHistoryEntry> {
        self.store.run_history()
    }

    /// 現在のストリーク（active Run のチェックインから毎回計算する）
    pub fn current_streak(&self) -> u32 {
        match self.store.active_run() {
            Some(run) => current_streak(&periods_from_checkins(&run.checkins)),
            None => 0,
        }
    }

    /// 過去最長ストリーク（active 内の最長と、履歴の clean_days の最大値）
    pub fn best_run(&self) -> u32 {
        let within_active = self
            .store
            .active_run()
            .map(|run| best_run_of(&periods_from_checkins(&run.checkins)))
            .unwrap_or(0);
        let in_history = self
            .store
            .run_history()
            .iter()
            .map(|e| e.clean_days)
            .max()
            .unwrap_or(0);
        within_active.max(in_history)
    }

    /// idle → active
    pub fn start_run(
        &self,
        protocol_id: &str,
        observe: Vec<String>,
    ) -> Result<Run, LifecycleError> {
        let protocol = find_protocol(protocol_id)
            .ok_or_else(|| LifecycleError::UnknownProtocol(protocol_id.to_string()))?;
        if self.store.active_run().is_some() {
            return Err(LifecycleError::AlreadyActive);
        }
        if !self.account.is_pro() && self.flags.lifetime_run_used() {
            return Err(LifecycleError::EntitlementRequired(
                "the free plan includes one run; upgrade to start another".to_string(),
            ));
        }
        self.validate_behaviours(&observe)?;

        let run = Run::start(self.id_gen.next_id(), protocol, self.clock.now_ms(), observe);
        self.store.start_run(&run)?;
        self.flags.set_current_protocol_id(Some(protocol.id))?;
        self.flags.set_cached_streak(0)?;
        self.log_lifecycle("run started", &run.id, run.display_status());
        Ok(run)
    }

    /// active → active（clean）または active → 終了（violated / 自動完了）
    ///
    /// 同じ UTC 日付への再申告は当日エントリを上書きする（upsert）。
    /// violated は無条件・即時に Run を終了させる。
    pub fn add_checkin(
        &self,
        run_id: &RunId,
        result: CheckinResult,
        note: Option<String>,
        behaviour_ids: Vec<String>,
    ) -> Result<Run, LifecycleError> {
        let mut run = self
            .store
            .active_run()
            .ok_or_else(|| LifecycleError::RunMismatch("no active run".to_string()))?;
        if &run.id != run_id {
            return Err(LifecycleError::RunMismatch(run_id.to_string()));
        }
        self.validate_behaviours(&behaviour_ids)?;

        let now = self.clock.now_ms();
        let today = date_of_ms(now);
        let replace_last = run
            .checkins
            .last()
            .map(|c| c.date() == today)
            .unwrap_or(false);
        let index = if replace_last {
            run.checkins.len() as u32
        } else {
            run.next_index()
        };
        let checkin = Checkin {
            index,
            result,
            note: normalize_note(note),
            created_at_ms: now,
            behaviour_ids,
        };
        if replace_last {
            let last = run.checkins.len() - 1;
            run.checkins[last] = checkin.clone();
        } else {
            run.checkins.push(checkin.clone());
        }

        match result {
            CheckinResult::Violated => {
                run.end(EndReason::Violation, now);
                self.archive(&run)?;
            }
            CheckinResult::Clean => {
                let streak = current_streak(&periods_from_checkins(&run.checkins));
                self.flags.set_cached_streak(streak)?;
                let run_length = find_protocol(&run.protocol_id)
                    .map(|p| p.run_length())
                    .unwrap_or(DEFAULT_RUN_LENGTH);
                if !self.account.is_pro() && streak >= run_length {
                    // 無料プランのみ: 規定長に達したら自動完了
                    run.end(EndReason::Completed, now);
                    self.archive(&run)?;
                } else {
                    self.store.add_checkin(&run, &checkin)?;
                }
            }
        }
        Ok(run)
    }

    /// active → ended（手動終了、Pro のみ）
    pub fn end_run(&self, run_id: &RunId) -> Result<EndOutcome, LifecycleError> {
        if !self.account.is_pro() {
            return Err(LifecycleError::EntitlementRequired(
                "manual run end requires Pro".to_string(),
            ));
        }
        if let Some(mut run) = self.store.active_run() {
            if &run.id != run_id {
                return Err(LifecycleError::RunMismatch(run_id.to_string()));
            }
            run.end(EndReason::Manual, self.clock.now_ms());
            let entry = self.archive(&run)?;
            return Ok(EndOutcome::Ended(entry));
        }
        // active ではないが既にアーカイブ済みなら成功扱い（冪等な再試行）
        if self.store.run_history().iter().any(|e| &e.id == run_id) {
            return Ok(EndOutcome::AlreadyEnded);
        }
        Err(LifecycleError::RunMismatch(run_id.to_string()))
    }

    /// 破壊的リセット: active ポインタと派生キャッシュを破棄する。
    /// アーカイブ済み履歴には触れない。
    pub fn clear_active_protocol(&self) -> Result<(), LifecycleError> {
        self.store.clear_active()?;
        self.flags.set_cached_streak(0)?;
        self.flags.set_current_protocol_id(None)?;
        Ok(())
    }

    fn validate_behaviours(&self, ids: &[String]) -> Result<(), LifecycleError> {
        if ids.is_empty() {
            return Ok(());
        }
        if !self.account.is_pro() {
            return Err(LifecycleError::EntitlementRequired(
                "behaviour tracking requires Pro".to_string(),
            ));
        }
        if ids.len() > MAX_OBSERVED_BEHAVIOURS {
            return Err(LifecycleError::InvalidArgument(format!(
                "at most {} behaviours can be observed",
                MAX_OBSERVED_BEHAVIOURS
            )));
        }
        for id in ids {
            if find_behaviour(id).is_none() {
                return Err(LifecycleError::InvalidArgument(format!(
                    "unknown behaviour: {}",
                    id
                )));
            }
        }
        Ok(())
    }

    /// 終了済み Run を履歴へアーカイブし、フラグを更新する。
    /// 無料プランの生涯フラグは理由を問わず全終了遷移で立てる。
    fn archive(&self, run: &Run) -> Result<RunHistoryEntry, LifecycleError> {
        let entry = RunHistoryEntry::from_run(run).ok_or_else(|| {
            LifecycleError::Storage(Error::system("archive called on an active run"))
        })?;
        self.store.end_run(run, &entry)?;
        self.flags.set_lifetime_run_used()?;
        self.flags.set_cached_streak(0)?;
        self.flags.set_current_protocol_id(None)?;
        self.log_lifecycle("run ended", &run.id, run.display_status());
        Ok(entry)
    }

    fn log_lifecycle(&self, message: &str, run_id: &RunId, status: &str) {
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, message, "usecase", "lifecycle")
                .with_field("run_id", serde_json::json!(run_id.as_str()))
                .with_field("status", serde_json::json!(status)),
        );
    }
}
