//! Run ストレージ Outbound ポート
//!
//! ローカル（単一端末）とリモート（複数端末）の 2 実装が同じ契約を満たす。
//! 読み取りは hydrate 後のメモリ内スナップショット。ミューテーションは
//! 成功時に即座に永続化される。並行書き込みの調停はしない（last write wins）。

use crate::domain::{Checkin, Run, RunHistoryEntry};
use common::error::Error;

/// Run の永続化契約
pub trait RunStore: Send + Sync {
    /// 永続データを読み込み、active Run と履歴（上限付き）をメモリへ展開する。
    /// 欠損・破損データはエラーにせず空状態へリセットする。
    fn hydrate(&self) -> Result<(), Error>;

    /// hydrate / 直近ミューテーション時点のスナップショット
    fn active_run(&self) -> Option<Run>;

    /// アーカイブ済み履歴のスナップショット（新しい順）
    fn run_history(&self) -> Vec<RunHistoryEntry>;

    /// 新しい active Run を永続化する
    fn start_run(&self, run: &Run) -> Result<(), Error>;

    /// チェックイン追記後の active Run を永続化する。
    /// `checkin` は追記（または同日 upsert）されたエントリで、
    /// リモート実装が index による upsert に使う。
    fn add_checkin(&self, run: &Run, checkin: &Checkin) -> Result<(), Error>;

    /// Run を終了する: 履歴へアーカイブし、active ポインタを消す
    fn end_run(&self, run: &Run, entry: &RunHistoryEntry) -> Result<(), Error>;

    /// 履歴へ ID で upsert する（マイグレーション用。重複を作らない）
    fn save_run(&self, entry: &RunHistoryEntry) -> Result<(), Error>;

    /// active ポインタのみ破棄する（アーカイブしない）
    fn clear_active(&self) -> Result<(), Error>;

    /// ローカル永続キーの全消去。リモート実装では no-op
    /// （リモートデータが暗黙に消されることはない）。
    fn clear_local_app_keys(&self) -> Result<(), Error>;
}
