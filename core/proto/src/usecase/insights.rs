//! インサイト集計のユースケース
//!
//! 各統計は毎回フル履歴（必要なら active Run のチェックイン込み）から
//! 計算し直す。増分集計やキャッシュは持たない。履歴は高々数百件の
//! 想定で、再計算コストより整合性の単純さを取る。

use crate::domain::{Account, Insight, Run, RunHistoryEntry, RunResult};
use crate::ports::outbound::RunStore;
use std::collections::BTreeMap;
use std::sync::Arc;

/// failure-day distribution のロック解除に必要な観測行動ログ数。
/// failed Run の件数ではない（観測された仕様をそのまま保持）。
const FAILURE_DAY_MIN_OBSERVATIONS: usize = 3;
/// breaking behaviour のロック解除に必要な（種類数, 総ログ数）
const BREAKING_BEHAVIOUR_MIN_DISTINCT: usize = 2;
const BREAKING_BEHAVIOUR_MIN_OBSERVATIONS: usize = 5;
/// longest clean run のロック解除に必要な総 Run 数（active 含む）
const LONGEST_CLEAN_MIN_RUNS: usize = 2;
/// average time between failures のロック解除に必要な総 Run 数
const AVG_FAILURE_GAP_MIN_RUNS: usize = 3;
/// distinct protocols のロック解除に必要な種類数
const DISTINCT_PROTOCOLS_MIN: usize = 2;

const MS_PER_DAY: u64 = 86_400_000;

/// インサイト集計のユースケース
pub struct InsightUseCase {
    store: Arc<dyn RunStore>,
    account: Account,
}

impl InsightUseCase {
    pub fn new(store: Arc<dyn RunStore>, account: Account) -> Self {
        Self { store, account }
    }

    /// failed Run が最も多く終わるセッション番号（clean_days + 1 の最頻値）
    pub fn failure_day_distribution(&self) -> Insight<u32> {
        let history = self.store.run_history();
        let active = self.store.active_run();
        if self.total_observations(&history, &active) < FAILURE_DAY_MIN_OBSERVATIONS {
            return Insight::locked(format!(
                "log at least {} behaviour observations to unlock",
                FAILURE_DAY_MIN_OBSERVATIONS
            ));
        }
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for entry in history.iter().filter(|e| e.result == RunResult::Failed) {
            *counts.entry(entry.clean_days + 1).or_default() += 1;
        }
        // 同数なら小さいセッション番号を採る（降順走査 + max_by_key は最後の最大値）
        match counts.iter().rev().max_by_key(|(_, n)| *n) {
            Some((day, _)) => Insight::unlocked(*day),
            None => Insight::unavailable(),
        }
    }

    /// 最も頻繁に記録された観測行動のラベル（Pro のみ）
    pub fn most_frequent_breaking_behaviour(&self) -> Insight<String> {
        if !self.account.is_pro() {
            return Insight::locked("behaviour insights require Pro");
        }
        let history = self.store.run_history();
        let active = self.store.active_run();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for id in self.observation_ids(&history, &active) {
            *counts.entry(id).or_default() += 1;
        }
        let total: usize = counts.values().sum();
        if counts.len() < BREAKING_BEHAVIOUR_MIN_DISTINCT
            || total < BREAKING_BEHAVIOUR_MIN_OBSERVATIONS
        {
            return Insight::locked(format!(
                "log at least {} observations across {} behaviours to unlock",
                BREAKING_BEHAVIOUR_MIN_OBSERVATIONS, BREAKING_BEHAVIOUR_MIN_DISTINCT
            ));
        }
        // 同数なら ID 辞書順で最初のものを採る
        match counts.iter().rev().max_by_key(|(_, n)| *n) {
            Some((id, _)) => Insight::unlocked(
                crate::domain::find_behaviour(id)
                    .map(|b| b.label.to_string())
                    .unwrap_or_else(|| id.clone()),
            ),
            None => Insight::unavailable(),
        }
    }

    /// 最長のクリーン日数（active Run の経過分も候補に含む）
    pub fn longest_clean_run(&self) -> Insight<u32> {
        let history = self.store.run_history();
        let active = self.store.active_run();
        let total_runs = history.len() + active.iter().count();
        if total_runs < LONGEST_CLEAN_MIN_RUNS {
            return Insight::locked(format!(
                "complete at least {} runs to unlock",
                LONGEST_CLEAN_MIN_RUNS
            ));
        }
        let from_history = history.iter().map(|e| e.clean_days).max().unwrap_or(0);
        let from_active = active.map(|run| run.clean_days()).unwrap_or(0);
        Insight::unlocked(from_history.max(from_active))
    }

    /// failed Run の終了時刻間の平均日数。
    /// しきい値を満たしても failed Run が 2 件未満なら値なし。
    pub fn avg_days_between_failures(&self) -> Insight<u32> {
        let history = self.store.run_history();
        let active = self.store.active_run();
        let total_runs = history.len() + active.iter().count();
        if total_runs < AVG_FAILURE_GAP_MIN_RUNS {
            return Insight::locked(format!(
                "complete at least {} runs to unlock",
                AVG_FAILURE_GAP_MIN_RUNS
            ));
        }
        let mut failures: Vec<u64> = history
            .iter()
            .filter(|e| e.result == RunResult::Failed)
            .map(|e| e.ended_at_ms)
            .collect();
        if failures.len() < 2 {
            return Insight::unavailable();
        }
        failures.sort_unstable();
        let gaps: Vec<u64> = failures
            .windows(2)
            .map(|w| (w[1] - w[0]) / MS_PER_DAY)
            .collect();
        let mean = gaps.iter().sum::<u64>() / gaps.len() as u64;
        Insight::unlocked(mean as u32)
    }

    /// 試行した異なるプロトコルの数
    pub fn distinct_protocols_attempted(&self) -> Insight<u32> {
        let history = self.store.run_history();
        let active = self.store.active_run();
        let mut ids: Vec<&str> = history.iter().map(|e| e.protocol_id.as_str()).collect();
        if let Some(run) = active.as_ref() {
            ids.push(run.protocol_id.as_str());
        }
        ids.sort_unstable();
        ids.dedup();
        if ids.len() < DISTINCT_PROTOCOLS_MIN {
            return Insight::locked(format!(
                "try at least {} different protocols to unlock",
                DISTINCT_PROTOCOLS_MIN
            ));
        }
        Insight::unlocked(ids.len() as u32)
    }

    /// 観測行動ログの総数（active のチェックイン分 + 履歴エントリの選択タグ分）
    fn total_observations(&self, history: &[RunHistoryEntry], active: &Option<Run>) -> usize {
        self.observation_ids(history, active).len()
    }

    fn observation_ids(&self, history: &[RunHistoryEntry], active: &Option<Run>) -> Vec<String> {
        let mut ids = Vec::new();
        if let Some(run) = active {
            for c in &run.checkins {
                ids.extend(c.behaviour_ids.iter().cloned());
            }
        }
        for entry in history {
            ids.extend(entry.observed_behaviour_ids.iter().cloned());
        }
        ids
    }
}
