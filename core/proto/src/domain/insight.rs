//! インサイト統計の値とロック状態
//!
//! 各統計は自分のデータ充足しきい値を満たすまで「ロック」される。
//! アンロック済みでも値が定義できない場合がある（value = None）。
//! その表示（"not enough data"）はプレゼンテーション層の責務。

/// 1 統計分の (値, ロック状態, ロック理由)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight<T> {
    pub value: Option<T>,
    pub locked: bool,
    pub lock_reason: Option<String>,
}

impl<T> Insight<T> {
    /// しきい値未達のためロック中
    pub fn locked(reason: impl Into<String>) -> Self {
        Insight {
            value: None,
            locked: true,
            lock_reason: Some(reason.into()),
        }
    }

    /// アンロック済みで値あり
    pub fn unlocked(value: T) -> Self {
        Insight {
            value: Some(value),
            locked: false,
            lock_reason: None,
        }
    }

    /// アンロック済みだが値が定義できない（例: failed Run が 2 件未満）
    pub fn unavailable() -> Self {
        Insight {
            value: None,
            locked: false,
            lock_reason: None,
        }
    }
}
