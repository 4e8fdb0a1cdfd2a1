//! エラーハンドリング
//!
//! 全レイヤー共通のエラー型。種別ごとのコンストラクタと
//! CLI 用の終了コードマッピング（64: 引数不正, 70: 内部, 74: I/O）を持つ。

use thiserror::Error as ThisError;

/// 共通エラー型
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// ファイル I/O 失敗
    #[error("{0}")]
    Io(String),
    /// JSON のシリアライズ・デシリアライズ失敗
    #[error("{0}")]
    Json(String),
    /// 引数・前提条件の不正
    #[error("{0}")]
    InvalidArgument(String),
    /// HTTP リクエスト失敗（接続・非 2xx・レスポンス不正）
    #[error("{0}")]
    Http(String),
    /// 環境変数の欠落・不正
    #[error("{0}")]
    Env(String),
    /// その他の内部エラー
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn io_msg(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Error::Json(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Error::Http(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Error::Env(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Error::System(msg.into())
    }

    /// CLI の終了コード（sysexits 準拠）
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) | Error::Env(_) => 64,
            Error::Json(_) | Error::System(_) => 70,
            Error::Io(_) | Error::Http(_) => 74,
        }
    }
}
