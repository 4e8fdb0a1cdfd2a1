//! プロトコルカタログ（ビルド時定義・読み取り専用）
//!
//! トレーダーが遵守を宣言する行動ルールの静的カタログと、
//! Pro 向けの観測行動（secondary signal）カタログ。どちらも変更・削除されない。

/// 無料プランの既定 Run 長（連続クリーン日数でこの値に達すると自動完了）
pub const DEFAULT_RUN_LENGTH: u32 = 5;

/// Run に紐づけられる観測行動タグの上限
pub const MAX_OBSERVED_BEHAVIOURS: usize = 2;

/// カタログエントリ（宣言的な行動ルール）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    /// 一意なスラッグ
    pub id: &'static str,
    pub name: &'static str,
    /// 遵守すべきルール（人間可読）
    pub rule: &'static str,
    /// 違反条件（人間可読）
    pub failure: &'static str,
    /// Run 長（日数）。未指定なら DEFAULT_RUN_LENGTH
    pub duration: Option<u32>,
    /// このプロトコルが取り除く典型行動
    pub common_behaviour_removed: Option<&'static str>,
}

impl Protocol {
    /// 自動完了までの Run 長
    pub fn run_length(&self) -> u32 {
        self.duration.unwrap_or(DEFAULT_RUN_LENGTH)
    }
}

static CATALOG: &[Protocol] = &[
    Protocol {
        id: "no-revenge-trading",
        name: "No Revenge Trading",
        rule: "After any losing trade, do not open a new position for the rest of the session.",
        failure: "Opening a new position in the same session as a realized loss.",
        duration: None,
        common_behaviour_removed: Some("doubling down after a loss"),
    },
    Protocol {
        id: "stop-loss-always",
        name: "Stop Loss Always",
        rule: "Every position has a stop loss set before entry, and it is never widened.",
        failure: "Entering without a stop, or moving a stop further from entry.",
        duration: None,
        common_behaviour_removed: Some("moving stops to avoid taking the loss"),
    },
    Protocol {
        id: "one-trade-per-day",
        name: "One Trade Per Day",
        rule: "Open at most one position per trading day.",
        failure: "Opening a second position on the same calendar day.",
        duration: None,
        common_behaviour_removed: Some("overtrading"),
    },
    Protocol {
        id: "no-averaging-down",
        name: "No Averaging Down",
        rule: "Never add to a losing position.",
        failure: "Adding size while the position is below entry.",
        duration: None,
        common_behaviour_removed: Some("averaging into losers"),
    },
    Protocol {
        id: "max-risk-one-percent",
        name: "Max 1% Risk",
        rule: "Risk at most 1% of the account on any single trade.",
        failure: "Position sizing that puts more than 1% of equity at the stop.",
        duration: None,
        common_behaviour_removed: Some("oversizing"),
    },
    Protocol {
        id: "plan-before-entry",
        name: "Plan Before Entry",
        rule: "Write entry, stop, and target down before placing any order.",
        failure: "Placing an order without a written plan.",
        duration: None,
        common_behaviour_removed: Some("impulse entries"),
    },
    Protocol {
        id: "no-news-trading",
        name: "No News Trading",
        rule: "Do not open positions within 30 minutes of scheduled high-impact news.",
        failure: "An entry inside the 30-minute news window.",
        duration: None,
        common_behaviour_removed: Some("chasing volatility spikes"),
    },
];

/// 観測行動（secondary signal）。Run を終了させることはなく、分析のみに使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Behaviour {
    pub id: &'static str,
    pub label: &'static str,
}

static BEHAVIOURS: &[Behaviour] = &[
    Behaviour {
        id: "moved-stop",
        label: "Moved a stop loss",
    },
    Behaviour {
        id: "oversized",
        label: "Position larger than planned",
    },
    Behaviour {
        id: "chased-entry",
        label: "Chased a missed entry",
    },
    Behaviour {
        id: "checked-pnl",
        label: "Checked PnL mid-trade",
    },
    Behaviour {
        id: "traded-off-plan",
        label: "Traded outside the written plan",
    },
];

/// カタログ全件（定義順）
pub fn catalog() -> &'static [Protocol] {
    CATALOG
}

/// ID でカタログを引く
pub fn find_protocol(id: &str) -> Option<&'static Protocol> {
    CATALOG.iter().find(|p| p.id == id)
}

/// 観測行動カタログ全件
pub fn behaviours() -> &'static [Behaviour] {
    BEHAVIOURS
}

/// ID で観測行動を引く
pub fn find_behaviour(id: &str) -> Option<&'static Behaviour> {
    BEHAVIOURS.iter().find(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for p in catalog() {
            assert!(seen.insert(p.id), "duplicate protocol id: {}", p.id);
        }
    }

    #[test]
    fn test_find_protocol() {
        assert_eq!(
            find_protocol("stop-loss-always").map(|p| p.name),
            Some("Stop Loss Always")
        );
        assert!(find_protocol("does-not-exist").is_none());
    }

    #[test]
    fn test_default_run_length() {
        let p = find_protocol("no-revenge-trading").unwrap();
        assert_eq!(p.run_length(), DEFAULT_RUN_LENGTH);
    }

    #[test]
    fn test_find_behaviour() {
        assert!(find_behaviour("moved-stop").is_some());
        assert!(find_behaviour("unknown").is_none());
    }
}
