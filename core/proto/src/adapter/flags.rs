//! ローカルフラグの標準実装（flags.json）
//!
//! 読み取りは壊れた値をデフォルトへ落とす。書き込みは即時永続化し、
//! 失敗はエラーとして返す（マイグレーション完了フラグは成功時のみ
//! 立てる必要があるため、Run データと違って飲み込まない）。

use crate::ports::outbound::FlagStore;
use common::error::Error;
use common::ports::outbound::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const FLAGS_FILENAME: &str = "flags.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Flags {
    #[serde(default)]
    migration_done: bool,
    #[serde(default)]
    lifetime_run_used: bool,
    #[serde(default)]
    cached_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_protocol_id: Option<String>,
}

/// flags.json を読み書きする FlagStore 実装
pub struct FileFlagStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    state: Mutex<Flags>,
}

impl FileFlagStore {
    /// flags.json を読み込んで初期化する（欠損・破損はデフォルト値）
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let flags = Self::load(&fs, &dir.join(FLAGS_FILENAME));
        Self {
            fs,
            dir,
            state: Mutex::new(flags),
        }
    }

    fn load(fs: &Arc<dyn FileSystem>, path: &Path) -> Flags {
        if !fs.exists(path) {
            return Flags::default();
        }
        fs.read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn save(&self, flags: &Flags) -> Result<(), Error> {
        self.fs.create_dir_all(&self.dir)?;
        let json = serde_json::to_string(flags).map_err(|e| Error::json(e.to_string()))?;
        self.fs.write(&self.dir.join(FLAGS_FILENAME), &json)
    }
}

impl FlagStore for FileFlagStore {
    fn migration_done(&self) -> bool {
        self.state.lock().unwrap().migration_done
    }

    fn set_migration_done(&self) -> Result<(), Error> {
        let mut flags = self.state.lock().unwrap();
        flags.migration_done = true;
        self.save(&flags)
    }

    fn lifetime_run_used(&self) -> bool {
        self.state.lock().unwrap().lifetime_run_used
    }

    fn set_lifetime_run_used(&self) -> Result<(), Error> {
        let mut flags = self.state.lock().unwrap();
        flags.lifetime_run_used = true;
        self.save(&flags)
    }

    fn cached_streak(&self) -> u32 {
        self.state.lock().unwrap().cached_streak
    }

    fn set_cached_streak(&self, streak: u32) -> Result<(), Error> {
        let mut flags = self.state.lock().unwrap();
        flags.cached_streak = streak;
        self.save(&flags)
    }

    fn current_protocol_id(&self) -> Option<String> {
        self.state.lock().unwrap().current_protocol_id.clone()
    }

    fn set_current_protocol_id(&self, id: Option<&str>) -> Result<(), Error> {
        let mut flags = self.state.lock().unwrap();
        flags.current_protocol_id = id.map(|s| s.to_string());
        self.save(&flags)
    }
}
