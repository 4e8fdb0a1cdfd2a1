//! インサイト集計とロック解錠しきい値の結合テスト

use std::sync::Arc;

use common::adapter::{NoopLog, StdFileSystem};
use common::ports::outbound::{FileSystem, Log};

use crate::adapter::FileRunStore;
use crate::domain::{Account, RunResult};
use crate::ports::outbound::RunStore;
use crate::tests::support::{
    history_entry, pro_account, DAY1_NOON_MS, MS_PER_DAY,
};
use crate::usecase::InsightUseCase;

struct InsightFixture {
    usecase: InsightUseCase,
    store: Arc<dyn RunStore>,
    _dir: tempfile::TempDir,
}

fn insight_fixture(account: Account) -> InsightFixture {
    let dir = tempfile::tempdir().unwrap();
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let log: Arc<dyn Log> = Arc::new(NoopLog);
    let store: Arc<dyn RunStore> =
        Arc::new(FileRunStore::new(Arc::clone(&fs), log, dir.path()));
    store.hydrate().unwrap();
    let usecase = InsightUseCase::new(Arc::clone(&store), account);
    InsightFixture {
        usecase,
        store,
        _dir: dir,
    }
}

#[test]
fn test_longest_clean_run_locked_below_two_runs() {
    let fx = insight_fixture(pro_account());
    fx.store
        .save_run(&history_entry(
            "run-a",
            "stop-loss-always",
            RunResult::Failed,
            3,
            DAY1_NOON_MS,
            &[],
        ))
        .unwrap();
    let insight = fx.usecase.longest_clean_run();
    assert!(insight.locked);
    assert!(insight.value.is_none());
}

#[test]
fn test_longest_clean_run_takes_maximum() {
    let fx = insight_fixture(pro_account());
    fx.store
        .save_run(&history_entry(
            "run-a",
            "stop-loss-always",
            RunResult::Failed,
            3,
            DAY1_NOON_MS,
            &[],
        ))
        .unwrap();
    fx.store
        .save_run(&history_entry(
            "run-b",
            "stop-loss-always",
            RunResult::Completed,
            5,
            DAY1_NOON_MS + 10 * MS_PER_DAY,
            &[],
        ))
        .unwrap();
    let insight = fx.usecase.longest_clean_run();
    assert!(!insight.locked);
    assert_eq!(insight.value, Some(5));
}

#[test]
fn test_failure_day_locked_until_three_observations() {
    let fx = insight_fixture(pro_account());
    fx.store
        .save_run(&history_entry(
            "run-a",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS,
            &["moved-stop", "oversized"],
        ))
        .unwrap();
    assert!(fx.usecase.failure_day_distribution().locked);

    fx.store
        .save_run(&history_entry(
            "run-b",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS + 5 * MS_PER_DAY,
            &["moved-stop"],
        ))
        .unwrap();
    // 3 観測で解錠。failed 2 件はどちらも 2 セッション目で終わっている
    let insight = fx.usecase.failure_day_distribution();
    assert!(!insight.locked);
    assert_eq!(insight.value, Some(2));
}

#[test]
fn test_failure_day_ties_pick_earliest_session() {
    let fx = insight_fixture(pro_account());
    let specs = [
        ("run-a", 0, &["moved-stop"][..]),
        ("run-b", 0, &["oversized"][..]),
        ("run-c", 4, &["moved-stop"][..]),
        ("run-d", 4, &[][..]),
    ];
    for (i, (id, clean, observed)) in specs.iter().enumerate() {
        fx.store
            .save_run(&history_entry(
                id,
                "stop-loss-always",
                RunResult::Failed,
                *clean,
                DAY1_NOON_MS + i as u64 * MS_PER_DAY,
                observed,
            ))
            .unwrap();
    }
    let insight = fx.usecase.failure_day_distribution();
    assert_eq!(insight.value, Some(1));
}

#[test]
fn test_breaking_behaviour_requires_pro() {
    let fx = insight_fixture(Account::unauthenticated());
    let insight = fx.usecase.most_frequent_breaking_behaviour();
    assert!(insight.locked);
}

#[test]
fn test_breaking_behaviour_needs_two_distinct_and_five_total() {
    let fx = insight_fixture(pro_account());
    fx.store
        .save_run(&history_entry(
            "run-a",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS,
            &["moved-stop", "moved-stop", "moved-stop", "moved-stop"],
        ))
        .unwrap();
    // 4 件・1 種類では足りない
    assert!(fx.usecase.most_frequent_breaking_behaviour().locked);

    fx.store
        .save_run(&history_entry(
            "run-b",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS + 3 * MS_PER_DAY,
            &["oversized"],
        ))
        .unwrap();
    let insight = fx.usecase.most_frequent_breaking_behaviour();
    assert!(!insight.locked);
    assert_eq!(insight.value.as_deref(), Some("Moved a stop loss"));
}

#[test]
fn test_avg_days_between_failures_gates_and_averages() {
    let fx = insight_fixture(pro_account());
    fx.store
        .save_run(&history_entry(
            "run-a",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS,
            &[],
        ))
        .unwrap();
    fx.store
        .save_run(&history_entry(
            "run-b",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS + 2 * MS_PER_DAY,
            &[],
        ))
        .unwrap();
    // 2 Run ではまだロック
    assert!(fx.usecase.avg_days_between_failures().locked);

    fx.store
        .save_run(&history_entry(
            "run-c",
            "one-trade-per-day",
            RunResult::Failed,
            1,
            DAY1_NOON_MS + 6 * MS_PER_DAY,
            &[],
        ))
        .unwrap();
    // 間隔 2 日と 4 日の平均
    let insight = fx.usecase.avg_days_between_failures();
    assert!(!insight.locked);
    assert_eq!(insight.value, Some(3));
}

#[test]
fn test_avg_days_unlocked_but_unavailable_without_two_failures() {
    let fx = insight_fixture(pro_account());
    for (i, id) in ["run-a", "run-b", "run-c"].iter().enumerate() {
        fx.store
            .save_run(&history_entry(
                id,
                "stop-loss-always",
                RunResult::Completed,
                5,
                DAY1_NOON_MS + i as u64 * MS_PER_DAY,
                &[],
            ))
            .unwrap();
    }
    let insight = fx.usecase.avg_days_between_failures();
    assert!(!insight.locked);
    assert!(insight.value.is_none());
}

#[test]
fn test_distinct_protocols_counts_unique_ids() {
    let fx = insight_fixture(pro_account());
    fx.store
        .save_run(&history_entry(
            "run-a",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS,
            &[],
        ))
        .unwrap();
    fx.store
        .save_run(&history_entry(
            "run-b",
            "stop-loss-always",
            RunResult::Failed,
            1,
            DAY1_NOON_MS + MS_PER_DAY,
            &[],
        ))
        .unwrap();
    // 同じプロトコル 2 回では 1 種類
    assert!(fx.usecase.distinct_protocols_attempted().locked);

    fx.store
        .save_run(&history_entry(
            "run-c",
            "one-trade-per-day",
            RunResult::Completed,
            5,
            DAY1_NOON_MS + 2 * MS_PER_DAY,
            &[],
        ))
        .unwrap();
    let insight = fx.usecase.distinct_protocols_attempted();
    assert_eq!(insight.value, Some(2));
}
