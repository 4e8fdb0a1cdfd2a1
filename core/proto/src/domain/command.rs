//! CLI から usecase へ渡すコマンド表現

use super::run::CheckinResult;

/// proto のサブコマンド（cli::parse_args の解析結果）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtoCommand {
    /// カタログ一覧を表示
    Protocols,
    /// Run を開始する
    Start {
        protocol_id: String,
        observe: Vec<String>,
    },
    /// 今日のチェックインを記録する
    Checkin {
        result: CheckinResult,
        note: Option<String>,
        observe: Vec<String>,
    },
    /// active な Run を手動終了する（Pro）
    End,
    /// active Run とストリークを表示
    Status,
    /// アーカイブ済み履歴を表示
    History,
    /// インサイト統計を表示
    Insights,
    /// active Run のポインタを破棄する（履歴は保持）
    Reset {
        /// ローカル永続キーをすべて消す
        wipe: bool,
    },
}
