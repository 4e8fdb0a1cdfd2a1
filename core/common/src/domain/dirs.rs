//! 実行時ディレクトリ（XDG / PROTO_HOME 解決結果）
//!
//! EnvResolver::resolve_dirs() で取得し、永続 Run データ・ログのパス計算に使う。

use std::path::PathBuf;

/// 解決済みの config / data / state ディレクトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl Dirs {
    /// Run データ（active_run.json / run_history.json / flags.json）の格納先
    pub fn runs_dir(&self) -> PathBuf {
        self.data_dir.join("runs")
    }

    /// JSONL ログの格納先
    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// アカウント設定ファイル（認証・エンタイトルメント連携の境界）
    pub fn account_path(&self) -> PathBuf {
        self.config_dir.join("account.json")
    }
}
