//! ローカル（単一端末）Run ストア
//!
//! active_run.json（単一オブジェクト、終了時に削除）と
//! run_history.json（配列、新しい順に prepend）を FileSystem ポート経由で
//! 丸ごと読み書きする。壊れた・欠けた永続データは空状態へ落とす。
//! 書き込み失敗（容量枯渇等）は warn ログのみで飲み込む。
//! これは台帳ではなくベストエフォートのキャッシュであるため。

use crate::domain::{Checkin, Run, RunHistoryEntry};
use crate::ports::outbound::RunStore;
use common::error::Error;
use common::ports::outbound::{FileSystem, Log, LogLevel, LogRecord};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const ACTIVE_RUN_FILENAME: &str = "active_run.json";
const RUN_HISTORY_FILENAME: &str = "run_history.json";
const FLAGS_FILENAME: &str = "flags.json";

/// hydrate 時にメモリへ載せる履歴の上限
const HYDRATE_HISTORY_LIMIT: usize = 200;

#[derive(Default)]
struct LocalState {
    active: Option<Run>,
    history: Vec<RunHistoryEntry>,
}

/// JSON ファイルに丸ごと永続化する RunStore 実装
pub struct FileRunStore {
    fs: Arc<dyn FileSystem>,
    log: Arc<dyn Log>,
    dir: PathBuf,
    state: Mutex<LocalState>,
}

impl FileRunStore {
    pub fn new(fs: Arc<dyn FileSystem>, log: Arc<dyn Log>, dir: impl AsRef<Path>) -> Self {
        Self {
            fs,
            log,
            dir: dir.as_ref().to_path_buf(),
            state: Mutex::new(LocalState::default()),
        }
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_RUN_FILENAME)
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(RUN_HISTORY_FILENAME)
    }

    fn warn(&self, message: String) {
        let _ = self.log.log(&LogRecord::new(
            LogLevel::Warn,
            message,
            "adapter",
            "storage",
        ));
    }

    /// ベストエフォート書き込み。失敗は warn ログのみで飲み込む。
    fn persist(&self, path: &Path, json: String) {
        if let Err(e) = self
            .fs
            .create_dir_all(&self.dir)
            .and_then(|_| self.fs.write(path, &json))
        {
            self.warn(format!("local write failed, keeping in-memory state: {}", e));
        }
    }

    fn persist_active(&self, active: &Option<Run>) {
        match active {
            Some(run) => match serde_json::to_string(run) {
                Ok(json) => self.persist(&self.active_path(), json),
                Err(e) => self.warn(format!("failed to serialize active run: {}", e)),
            },
            None => {
                let path = self.active_path();
                if self.fs.exists(&path) {
                    if let Err(e) = self.fs.remove_file(&path) {
                        self.warn(format!("failed to remove active run file: {}", e));
                    }
                }
            }
        }
    }

    fn persist_history(&self, history: &[RunHistoryEntry]) {
        match serde_json::to_string(history) {
            Ok(json) => self.persist(&self.history_path(), json),
            Err(e) => self.warn(format!("failed to serialize run history: {}", e)),
        }
    }

    fn load_active(&self) -> Option<Run> {
        let path = self.active_path();
        if !self.fs.exists(&path) {
            return None;
        }
        let s = self.fs.read_to_string(&path).ok()?;
        let run: Run = match serde_json::from_str(&s) {
            Ok(run) => run,
            Err(e) => {
                self.warn(format!("malformed active run, treating as absent: {}", e));
                return None;
            }
        };
        if let Err(reason) = run.validate() {
            self.warn(format!("invalid active run, treating as absent: {}", reason));
            return None;
        }
        Some(run)
    }

    fn load_history(&self) -> Vec<RunHistoryEntry> {
        let path = self.history_path();
        if !self.fs.exists(&path) {
            return Vec::new();
        }
        let s = match self.fs.read_to_string(&path) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        let entries: Vec<RunHistoryEntry> = match serde_json::from_str(&s) {
            Ok(entries) => entries,
            Err(e) => {
                self.warn(format!("malformed run history, resetting to empty: {}", e));
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter(|e| match e.validate() {
                Ok(()) => true,
                Err(reason) => {
                    self.warn(format!("dropping invalid history entry: {}", reason));
                    false
                }
            })
            .take(HYDRATE_HISTORY_LIMIT)
            .collect()
    }
}

impl RunStore for FileRunStore {
    fn hydrate(&self) -> Result<(), Error> {
        let active = self.load_active();
        let history = self.load_history();
        let mut state = self.state.lock().unwrap();
        state.active = active;
        state.history = history;
        Ok(())
    }

    fn active_run(&self) -> Option<Run> {
        self.state.lock().unwrap().active.clone()
    }

    fn run_history(&self) -> Vec<RunHistoryEntry> {
        self.state.lock().unwrap().history.clone()
    }

    fn start_run(&self, run: &Run) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.active = Some(run.clone());
        self.persist_active(&state.active);
        Ok(())
    }

    fn add_checkin(&self, run: &Run, _checkin: &Checkin) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.active = Some(run.clone());
        self.persist_active(&state.active);
        Ok(())
    }

    fn end_run(&self, _run: &Run, entry: &RunHistoryEntry) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.active = None;
        state.history.insert(0, entry.clone());
        self.persist_active(&state.active);
        self.persist_history(&state.history);
        Ok(())
    }

    fn save_run(&self, entry: &RunHistoryEntry) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        match state.history.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => state.history.insert(0, entry.clone()),
        }
        self.persist_history(&state.history);
        Ok(())
    }

    fn clear_active(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.active = None;
        self.persist_active(&state.active);
        Ok(())
    }

    fn clear_local_app_keys(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.active = None;
        state.history.clear();
        for name in [ACTIVE_RUN_FILENAME, RUN_HISTORY_FILENAME, FLAGS_FILENAME] {
            let path = self.dir.join(name);
            if self.fs.exists(&path) {
                if let Err(e) = self.fs.remove_file(&path) {
                    self.warn(format!("failed to remove '{}': {}", path.display(), e));
                }
            }
        }
        Ok(())
    }
}
