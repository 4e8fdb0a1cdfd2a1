//! ストア選択とリモートフォールバックの結合テスト

use std::sync::Arc;

use common::adapter::{NoopLog, StdFileSystem};
use common::domain::RunId;
use common::ports::outbound::{FileSystem, Log};

use crate::adapter::{select_store, FileRunStore, RemoteRunStore};
use crate::domain::{find_protocol, Account, Run, RunResult, Tier, UserId};
use crate::ports::outbound::{RemoteApi, RemoteConnector, RunStore};
use crate::tests::support::{history_entry, test_user, FakeRemoteApi, DAY1_NOON_MS};

struct FakeConnector {
    api: Option<Arc<FakeRemoteApi>>,
}

impl RemoteConnector for FakeConnector {
    fn connect(&self) -> Option<Arc<dyn RemoteApi>> {
        self.api.clone().map(|api| api as Arc<dyn RemoteApi>)
    }
}

fn local_store() -> (Arc<dyn RunStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let log: Arc<dyn Log> = Arc::new(NoopLog);
    let store: Arc<dyn RunStore> =
        Arc::new(FileRunStore::new(fs, log, dir.path()));
    store.hydrate().unwrap();
    (store, dir)
}

fn sample_run(id: &str) -> Run {
    let protocol = find_protocol("stop-loss-always").unwrap();
    Run::start(RunId::new(id), protocol, DAY1_NOON_MS, Vec::new())
}

fn remote_fixture() -> (RemoteRunStore, Arc<FakeRemoteApi>, Arc<dyn RunStore>, tempfile::TempDir) {
    let (local, dir) = local_store();
    let api = FakeRemoteApi::shared();
    let store = RemoteRunStore::new(
        api.clone(),
        test_user(),
        Arc::clone(&local),
        Arc::new(NoopLog),
    );
    (store, api, local, dir)
}

#[test]
fn test_select_store_prefers_remote_for_eligible_account() {
    let (local, _dir) = local_store();
    let account = Account {
        user_id: Some(UserId::new("user-1")),
        tier: Tier::Pro,
        remote_endpoint: Some("https://example.test".to_string()),
    };
    let connector = FakeConnector {
        api: Some(FakeRemoteApi::shared()),
    };
    let selection = select_store(&account, local, &connector, Arc::new(NoopLog));
    assert!(selection.remote.is_some());
}

#[test]
fn test_select_store_falls_back_when_connect_fails() {
    let (local, _dir) = local_store();
    let account = Account {
        user_id: Some(UserId::new("user-1")),
        tier: Tier::Pro,
        remote_endpoint: Some("https://example.test".to_string()),
    };
    let connector = FakeConnector { api: None };
    let selection = select_store(&account, local, &connector, Arc::new(NoopLog));
    assert!(selection.remote.is_none());
}

#[test]
fn test_remote_store_writes_through_to_api() {
    let (store, api, _local, _dir) = remote_fixture();
    let run = sample_run("run-1");
    store.start_run(&run).unwrap();
    assert_eq!(store.active_run().map(|r| r.id), Some(run.id.clone()));
    assert!(api.state.lock().unwrap().active_run.is_some());
}

#[test]
fn test_remote_write_failure_degrades_to_local() {
    let (store, api, local, _dir) = remote_fixture();
    api.set_fail_writes(true);

    let run = sample_run("run-1");
    // 失敗はユーザー操作をブロックしない
    store.start_run(&run).unwrap();
    assert_eq!(store.active_run().map(|r| r.id), Some(run.id.clone()));
    // リモートには届かず、ローカルへ退避されている
    assert!(api.state.lock().unwrap().active_run.is_none());
    assert_eq!(local.active_run().map(|r| r.id), Some(run.id));
}

#[test]
fn test_remote_hydrate_failure_resets_to_empty() {
    let (store, api, _local, _dir) = remote_fixture();
    let run = sample_run("run-1");
    store.start_run(&run).unwrap();

    api.set_fail_writes(true);
    store.hydrate().unwrap();
    assert!(store.active_run().is_none());
    assert!(store.run_history().is_empty());
}

#[test]
fn test_remote_end_run_archives_and_clears_active() {
    let (store, api, _local, _dir) = remote_fixture();
    let mut run = sample_run("run-1");
    store.start_run(&run).unwrap();
    run.end(crate::domain::EndReason::Manual, DAY1_NOON_MS + 1000);
    let entry = crate::domain::RunHistoryEntry::from_run(&run).unwrap();

    store.end_run(&run, &entry).unwrap();
    assert!(store.active_run().is_none());
    assert_eq!(store.run_history().len(), 1);
    let state = api.state.lock().unwrap();
    assert!(state.active_run.is_none());
    assert_eq!(state.history.len(), 1);
}

#[test]
fn test_remote_save_run_propagates_failure() {
    let (store, api, _local, _dir) = remote_fixture();
    api.set_fail_writes(true);
    let entry = history_entry(
        "run-a",
        "stop-loss-always",
        RunResult::Failed,
        1,
        DAY1_NOON_MS,
        &[],
    );
    assert!(store.save_run(&entry).is_err());
    assert!(store.run_history().is_empty());
}

#[test]
fn test_remote_clear_local_app_keys_never_touches_remote_data() {
    let (store, api, _local, _dir) = remote_fixture();
    let run = sample_run("run-1");
    store.start_run(&run).unwrap();

    store.clear_local_app_keys().unwrap();
    assert!(api.state.lock().unwrap().active_run.is_some());
}

#[test]
fn test_remote_hydrate_skips_invalid_entries() {
    let (store, api, _local, _dir) = remote_fixture();
    let mut bad = history_entry(
        "run-bad",
        "stop-loss-always",
        RunResult::Failed,
        1,
        DAY1_NOON_MS,
        &[],
    );
    bad.started_at_ms = bad.ended_at_ms + 1;
    api.upsert_history_entry(&test_user(), &bad).unwrap();
    api.upsert_history_entry(
        &test_user(),
        &history_entry(
            "run-good",
            "stop-loss-always",
            RunResult::Completed,
            5,
            DAY1_NOON_MS,
            &[],
        ),
    )
    .unwrap();

    store.hydrate().unwrap();
    let history = store.run_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id.as_str(), "run-good");
}
