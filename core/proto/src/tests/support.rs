//! テスト用のフェイク実装と組み立てヘルパ

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use common::adapter::{NoopLog, StdFileSystem};
use common::domain::RunId;
use common::error::Error;
use common::ports::outbound::{Clock, FileSystem, IdGenerator, Log};

use crate::adapter::{FileFlagStore, FileRunStore};
use crate::domain::{Account, Checkin, Run, RunHistoryEntry, Tier, UserId};
use crate::ports::outbound::{FlagStore, RemoteApi, RemoteState, RunStore};
use crate::usecase::LifecycleUseCase;

pub const MS_PER_DAY: u64 = 86_400_000;

/// 2026-01-01T12:00:00Z
pub const DAY1_NOON_MS: u64 = 1_767_268_800_000;

/// 進められる固定時刻
pub struct FixedClock {
    now_ms: Mutex<u64>,
}

impl FixedClock {
    pub fn at(ms: u64) -> Arc<Self> {
        Arc::new(Self {
            now_ms: Mutex::new(ms),
        })
    }

    pub fn advance_days(&self, days: u64) {
        *self.now_ms.lock().unwrap() += days * MS_PER_DAY;
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        *self.now_ms.lock().unwrap()
    }
}

/// 連番の RunId を返す
pub struct SeqIdGenerator {
    next: AtomicU64,
}

impl SeqIdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SeqIdGenerator {
    fn next_id(&self) -> RunId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        RunId::new(format!("run-{:04}", n))
    }
}

/// メモリ上のリモートストア。失敗注入フラグ付き。
#[derive(Default)]
pub struct FakeRemoteApi {
    pub state: Mutex<FakeRemoteState>,
    pub fail_writes: AtomicBool,
}

#[derive(Default)]
pub struct FakeRemoteState {
    pub active_run: Option<Run>,
    /// entry_id -> entry（ID upsert を模す）
    pub history: BTreeMap<String, RunHistoryEntry>,
    /// (run_id, index) -> checkin
    pub checkins: BTreeMap<(String, u32), Checkin>,
}

impl FakeRemoteApi {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_fail(&self) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::http("injected remote failure"));
        }
        Ok(())
    }
}

impl RemoteApi for FakeRemoteApi {
    fn fetch_state(&self, _user: &UserId) -> Result<RemoteState, Error> {
        self.check_fail()?;
        let state = self.state.lock().unwrap();
        Ok(RemoteState {
            active_run: state.active_run.clone(),
            history: state.history.values().cloned().collect(),
        })
    }

    fn put_active_run(&self, _user: &UserId, run: &Run) -> Result<(), Error> {
        self.check_fail()?;
        self.state.lock().unwrap().active_run = Some(run.clone());
        Ok(())
    }

    fn delete_active_run(&self, _user: &UserId, _run_id: &RunId) -> Result<(), Error> {
        self.check_fail()?;
        self.state.lock().unwrap().active_run = None;
        Ok(())
    }

    fn upsert_checkin(
        &self,
        _user: &UserId,
        run_id: &RunId,
        checkin: &Checkin,
    ) -> Result<(), Error> {
        self.check_fail()?;
        self.state
            .lock()
            .unwrap()
            .checkins
            .insert((run_id.to_string(), checkin.index), checkin.clone());
        Ok(())
    }

    fn upsert_history_entry(&self, _user: &UserId, entry: &RunHistoryEntry) -> Result<(), Error> {
        self.check_fail()?;
        self.state
            .lock()
            .unwrap()
            .history
            .insert(entry.id.to_string(), entry.clone());
        Ok(())
    }
}

pub fn free_account() -> Account {
    Account::unauthenticated()
}

pub fn pro_account() -> Account {
    Account {
        user_id: Some(UserId::new("user-1")),
        tier: Tier::Pro,
        remote_endpoint: None,
    }
}

pub fn test_user() -> UserId {
    UserId::new("user-1")
}

/// tempdir 上の実ファイルストアで LifecycleUseCase を組む
pub struct Fixture {
    pub lifecycle: LifecycleUseCase,
    pub store: Arc<dyn RunStore>,
    pub flags: Arc<dyn FlagStore>,
    pub clock: Arc<FixedClock>,
    // Drop でディレクトリごと消える
    _dir: tempfile::TempDir,
}

pub fn fixture(account: Account) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let log: Arc<dyn Log> = Arc::new(NoopLog);
    let clock = FixedClock::at(DAY1_NOON_MS);
    let store: Arc<dyn RunStore> =
        Arc::new(FileRunStore::new(Arc::clone(&fs), Arc::clone(&log), dir.path()));
    let flags: Arc<dyn FlagStore> = Arc::new(FileFlagStore::new(Arc::clone(&fs), dir.path()));
    store.hydrate().unwrap();
    let lifecycle = LifecycleUseCase::new(
        Arc::clone(&store),
        Arc::clone(&flags),
        Arc::clone(&clock) as Arc<dyn Clock>,
        Arc::new(SeqIdGenerator::new()),
        log,
        account,
    );
    Fixture {
        lifecycle,
        store,
        flags,
        clock,
        _dir: dir,
    }
}

/// アーカイブ済みエントリを手早く作る
pub fn history_entry(
    id: &str,
    protocol_id: &str,
    result: crate::domain::RunResult,
    clean_days: u32,
    ended_at_ms: u64,
    observed: &[&str],
) -> RunHistoryEntry {
    RunHistoryEntry {
        id: RunId::new(id),
        protocol_id: protocol_id.to_string(),
        protocol_name: protocol_id.to_string(),
        started_at_ms: ended_at_ms.saturating_sub(MS_PER_DAY * (clean_days as u64 + 1)),
        ended_at_ms,
        result,
        clean_days,
        observed_behaviour_ids: observed.iter().map(|s| s.to_string()).collect(),
        notes: Vec::new(),
    }
}
