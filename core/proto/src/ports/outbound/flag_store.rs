//! ローカル専用スカラーフラグの Outbound ポート
//!
//! マイグレーション完了・無料プラン生涯利用・ストリークキャッシュ・
//! 現在プロトコルのポインタ。いずれもローカルにのみ永続化される。
//! 読み取りは壊れた値をデフォルトへ落とす（エラーにしない）。

use common::error::Error;

/// 補助スカラーフラグの永続化契約
pub trait FlagStore: Send + Sync {
    /// ローカル→リモート移行が完了済みか
    fn migration_done(&self) -> bool;
    fn set_migration_done(&self) -> Result<(), Error>;

    /// 無料プランの生涯 1 Run を消費済みか
    fn lifetime_run_used(&self) -> bool;
    fn set_lifetime_run_used(&self) -> Result<(), Error>;

    /// 現在ストリークの表示用キャッシュ
    fn cached_streak(&self) -> u32;
    fn set_cached_streak(&self, streak: u32) -> Result<(), Error>;

    /// 現在有効化中のプロトコル ID
    fn current_protocol_id(&self) -> Option<String>;
    fn set_current_protocol_id(&self, id: Option<&str>) -> Result<(), Error>;
}
