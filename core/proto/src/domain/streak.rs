//! ストリーク計算（純関数）
//!
//! 周期＝UTC のカレンダー日。隣接は「ちょうど 1 日差」のみ。
//! 1 日以上の空白は、両側がクリーンでもストリークを切る。

use super::run::{Checkin, CheckinResult};
use chrono::NaiveDate;

/// 1 周期分の記録（日付と、その日がクリーンだったか）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub date: NaiveDate,
    pub clean: bool,
}

/// チェックイン列を日付順の周期列へ変換する
///
/// 同一日付に複数エントリがある場合（upsert 前の古い形式など）は最後の値が勝つ。
pub fn periods_from_checkins(checkins: &[Checkin]) -> Vec<Period> {
    let mut periods: Vec<Period> = Vec::with_capacity(checkins.len());
    for c in checkins {
        let p = Period {
            date: c.date(),
            clean: c.result == CheckinResult::Clean,
        };
        match periods.iter_mut().find(|q| q.date == p.date) {
            Some(q) => *q = p,
            None => periods.push(p),
        }
    }
    periods.sort_by_key(|p| p.date);
    periods
}

/// 現在のストリーク
///
/// 最新の周期から 1 日ずつ遡り、クリーンかつ日付が厳密に隣接している間だけ数える。
pub fn current_streak(periods: &[Period]) -> u32 {
    let mut sorted = periods.to_vec();
    sorted.sort_by_key(|p| p.date);

    let mut count = 0u32;
    let mut expected: Option<NaiveDate> = None;
    for p in sorted.iter().rev() {
        if !p.clean {
            break;
        }
        match expected {
            None => {}
            Some(d) if p.date == d => {}
            Some(_) => break,
        }
        count += 1;
        expected = p.date.pred_opt();
    }
    count
}

/// 過去最長のストリーク
///
/// 時系列で走査し、非クリーン周期または 1 日超の空白でカウンタを 0 に戻し、
/// 観測された最大値を返す。
pub fn best_run(periods: &[Period]) -> u32 {
    let mut sorted = periods.to_vec();
    sorted.sort_by_key(|p| p.date);

    let mut best = 0u32;
    let mut running = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for p in &sorted {
        if !p.clean {
            running = 0;
        } else {
            let adjacent = match prev {
                Some(d) => d.succ_opt() == Some(p.date),
                None => false,
            };
            running = if adjacent { running + 1 } else { 1 };
            best = best.max(running);
        }
        prev = Some(p.date);
    }
    best
}
