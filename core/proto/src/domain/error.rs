//! ライフサイクル操作の前提条件違反
//!
//! ストレージ・通信の失敗（common::Error）とは区別し、
//! 呼び出し側が名前で分岐できる失敗条件として表す。

use common::error::Error;
use thiserror::Error as ThisError;

/// Run ライフサイクル操作の失敗
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum LifecycleError {
    /// active な Run が既に存在する
    #[error("a run is already active; end it before starting a new one")]
    AlreadyActive,
    /// カタログに存在しないプロトコル ID
    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),
    /// プランによる制限（無料プランの生涯 1 Run、手動終了、観測行動タグ等）
    #[error("Pro plan required: {0}")]
    EntitlementRequired(String),
    /// 指定された Run ID が現在の active Run と一致しない
    #[error("run id does not match: {0}")]
    RunMismatch(String),
    /// 引数の不正（タグ過多・未知の行動 ID 等）
    #[error("{0}")]
    InvalidArgument(String),
    /// ストレージ層の失敗
    #[error(transparent)]
    Storage(#[from] Error),
}

impl From<LifecycleError> for Error {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Storage(e) => e,
            other => Error::invalid_argument(other.to_string()),
        }
    }
}
