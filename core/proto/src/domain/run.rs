//! Run / Checkin のドメイン型と構造バリデーション
//!
//! 正準表現は `status ∈ {Active, Ended}` + 終了 Run に必須の `end_reason`。
//! 表示用の語彙（active / failed / completed / ended）は境界で導出する。
//! 永続データはこの型の serde スキーマで読み書きし、壊れた値は
//! ストレージ境界で「存在しない」へ落とす（エラーを伝播させない）。

use super::protocol::Protocol;
use chrono::NaiveDate;
use common::domain::RunId;
use serde::{Deserialize, Serialize};

/// チェックインの自己申告結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinResult {
    Clean,
    Violated,
}

/// 1 周期（日）あたり 1 件のチェックイン
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkin {
    /// Run 内での 1 始まり連番（欠番なし）
    pub index: u32,
    pub result: CheckinResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at_ms: u64,
    /// 観測行動タグ（Pro。Run を終了させない）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviour_ids: Vec<String>,
}

impl Checkin {
    /// チェックインの属する周期（UTC 日付）
    pub fn date(&self) -> NaiveDate {
        date_of_ms(self.created_at_ms)
    }
}

/// ミリ秒タイムスタンプ → UTC 日付
pub fn date_of_ms(ms: u64) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(ms as i64)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// note の正規化（trim、空文字は absent）
pub fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Run の状態（正準 2 状態）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    Ended,
}

/// 終了理由。`status = Ended` の Run に必須。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Violation,
    Manual,
    Completed,
}

/// 1 回の遵守挑戦
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub protocol_id: String,
    /// 有効化時点のプロトコル名の非正規化コピー。
    /// カタログが変わっても履歴を書き換えないための意図的な冗長。
    pub protocol_name: String,
    pub status: RunStatus,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    /// Run 開始時に選んだ観測行動タグ（≤2、Pro のみ）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observed_behaviour_ids: Vec<String>,
    #[serde(default)]
    pub checkins: Vec<Checkin>,
}

impl Run {
    /// 新しい active Run を作る（チェックインなし、終了情報なし）
    pub fn start(
        id: RunId,
        protocol: &Protocol,
        started_at_ms: u64,
        observed_behaviour_ids: Vec<String>,
    ) -> Self {
        Run {
            id,
            protocol_id: protocol.id.to_string(),
            protocol_name: protocol.name.to_string(),
            status: RunStatus::Active,
            started_at_ms,
            ended_at_ms: None,
            end_reason: None,
            observed_behaviour_ids,
            checkins: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RunStatus::Active
    }

    /// クリーンなチェックインの数
    pub fn clean_days(&self) -> u32 {
        self.checkins
            .iter()
            .filter(|c| c.result == CheckinResult::Clean)
            .count() as u32
    }

    /// 次のチェックイン連番
    pub fn next_index(&self) -> u32 {
        self.checkins.len() as u32 + 1
    }

    /// Run を終了状態へ遷移させる（ended_at / end_reason は一度だけ設定）
    pub fn end(&mut self, reason: EndReason, ended_at_ms: u64) {
        self.status = RunStatus::Ended;
        self.end_reason = Some(reason);
        self.ended_at_ms = Some(ended_at_ms);
    }

    /// 表示用ステータス（richer vocabulary への変換）
    pub fn display_status(&self) -> &'static str {
        match (self.status, self.end_reason) {
            (RunStatus::Active, _) => "active",
            (RunStatus::Ended, Some(EndReason::Violation)) => "failed",
            (RunStatus::Ended, Some(EndReason::Completed)) => "completed",
            (RunStatus::Ended, _) => "ended",
        }
    }

    /// ロード時の構造バリデーション
    ///
    /// - Ended ⇔ ended_at と end_reason が両方存在
    /// - started_at ≤ ended_at
    /// - チェックイン連番は 1 始まり・欠番なし
    pub fn validate(&self) -> Result<(), String> {
        match self.status {
            RunStatus::Active => {
                if self.ended_at_ms.is_some() || self.end_reason.is_some() {
                    return Err("active run carries end fields".to_string());
                }
            }
            RunStatus::Ended => {
                if self.ended_at_ms.is_none() || self.end_reason.is_none() {
                    return Err("ended run is missing ended_at or end_reason".to_string());
                }
            }
        }
        if let Some(ended) = self.ended_at_ms {
            if self.started_at_ms > ended {
                return Err("started_at is after ended_at".to_string());
            }
        }
        for (i, c) in self.checkins.iter().enumerate() {
            if c.index != i as u32 + 1 {
                return Err(format!(
                    "checkin index {} at position {} breaks the sequence",
                    c.index, i
                ));
            }
        }
        Ok(())
    }
}

/// 履歴エントリの結果（表示語彙）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    Completed,
    Failed,
    Ended,
}

impl From<EndReason> for RunResult {
    fn from(reason: EndReason) -> Self {
        match reason {
            EndReason::Violation => RunResult::Failed,
            EndReason::Completed => RunResult::Completed,
            EndReason::Manual => RunResult::Ended,
        }
    }
}

/// 履歴エントリに残すチェックイン note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunNote {
    pub date: NaiveDate,
    pub text: String,
}

/// 終了した Run のアーカイブ形
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistoryEntry {
    pub id: RunId,
    pub protocol_id: String,
    pub protocol_name: String,
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub result: RunResult,
    pub clean_days: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observed_behaviour_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<RunNote>,
}

impl RunHistoryEntry {
    /// 終了済み Run からアーカイブ形を導出する。active な Run には None。
    pub fn from_run(run: &Run) -> Option<Self> {
        let reason = run.end_reason?;
        let ended_at_ms = run.ended_at_ms?;
        let notes = run
            .checkins
            .iter()
            .filter_map(|c| {
                c.note.as_ref().map(|text| RunNote {
                    date: c.date(),
                    text: text.clone(),
                })
            })
            .collect();
        Some(RunHistoryEntry {
            id: run.id.clone(),
            protocol_id: run.protocol_id.clone(),
            protocol_name: run.protocol_name.clone(),
            started_at_ms: run.started_at_ms,
            ended_at_ms,
            result: reason.into(),
            clean_days: run.clean_days(),
            observed_behaviour_ids: run.observed_behaviour_ids.clone(),
            notes,
        })
    }

    /// ロード時の構造バリデーション
    pub fn validate(&self) -> Result<(), String> {
        if self.started_at_ms > self.ended_at_ms {
            return Err("started_at is after ended_at".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::protocol::find_protocol;
    use super::*;

    fn active_run() -> Run {
        Run::start(
            RunId::new("00000001"),
            find_protocol("stop-loss-always").unwrap(),
            1_700_000_000_000,
            Vec::new(),
        )
    }

    #[test]
    fn test_start_denormalizes_protocol_name() {
        let run = active_run();
        assert_eq!(run.protocol_id, "stop-loss-always");
        assert_eq!(run.protocol_name, "Stop Loss Always");
        assert!(run.is_active());
        assert!(run.checkins.is_empty());
    }

    #[test]
    fn test_normalize_note() {
        assert_eq!(normalize_note(None), None);
        assert_eq!(normalize_note(Some("  ".to_string())), None);
        assert_eq!(
            normalize_note(Some("  held the stop  ".to_string())),
            Some("held the stop".to_string())
        );
    }

    #[test]
    fn test_validate_rejects_ended_without_reason() {
        let mut run = active_run();
        run.status = RunStatus::Ended;
        run.ended_at_ms = Some(run.started_at_ms + 1);
        assert!(run.validate().is_err());
        run.end_reason = Some(EndReason::Manual);
        assert!(run.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_active_with_end_fields() {
        let mut run = active_run();
        run.ended_at_ms = Some(run.started_at_ms);
        assert!(run.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_index_gap() {
        let mut run = active_run();
        run.checkins.push(Checkin {
            index: 1,
            result: CheckinResult::Clean,
            note: None,
            created_at_ms: run.started_at_ms,
            behaviour_ids: Vec::new(),
        });
        run.checkins.push(Checkin {
            index: 3,
            result: CheckinResult::Clean,
            note: None,
            created_at_ms: run.started_at_ms + 86_400_000,
            behaviour_ids: Vec::new(),
        });
        assert!(run.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let mut run = active_run();
        run.end(EndReason::Manual, run.started_at_ms - 1);
        assert!(run.validate().is_err());
    }

    #[test]
    fn test_history_entry_from_run_extracts_notes() {
        let mut run = active_run();
        run.checkins.push(Checkin {
            index: 1,
            result: CheckinResult::Clean,
            note: Some("stayed flat after the loss".to_string()),
            created_at_ms: run.started_at_ms,
            behaviour_ids: Vec::new(),
        });
        run.checkins.push(Checkin {
            index: 2,
            result: CheckinResult::Violated,
            note: None,
            created_at_ms: run.started_at_ms + 86_400_000,
            behaviour_ids: Vec::new(),
        });
        run.end(EndReason::Violation, run.started_at_ms + 86_400_000);

        let entry = RunHistoryEntry::from_run(&run).unwrap();
        assert_eq!(entry.result, RunResult::Failed);
        assert_eq!(entry.clean_days, 1);
        assert_eq!(entry.notes.len(), 1);
        assert_eq!(entry.notes[0].text, "stayed flat after the loss");
    }

    #[test]
    fn test_history_entry_requires_ended_run() {
        assert!(RunHistoryEntry::from_run(&active_run()).is_none());
    }

    #[test]
    fn test_display_status_vocabulary() {
        let mut run = active_run();
        assert_eq!(run.display_status(), "active");
        run.end(EndReason::Violation, run.started_at_ms + 1);
        assert_eq!(run.display_status(), "failed");
    }
}
