//! 環境変数解決 Outbound ポート
//!
//! config / data / state ディレクトリを環境変数から解決する。
//! usecase はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::Dirs;
use crate::error::Error;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// 実行時ディレクトリを解決する
    ///
    /// 優先順位:
    /// 1. PROTO_HOME（設定されていれば config/data/state すべてその配下）
    /// 2. $XDG_CONFIG_HOME / $XDG_DATA_HOME / $XDG_STATE_HOME の各 proto サブディレクトリ
    /// 3. $HOME/.config/proto, $HOME/.local/share/proto, $HOME/.local/state/proto
    fn resolve_dirs(&self) -> Result<Dirs, Error>;
}
