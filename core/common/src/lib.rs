//! proto 共通ライブラリ
//!
//! `proto` コマンドの各レイヤー（usecase / adapter / cli）で共有される
//! エラー型・ポート・標準アダプタを提供する。

/// エラーハンドリング
pub mod error;

/// ドメイン型（ディレクトリ・Run ID 等）
pub mod domain;

/// Outbound ポート（trait 定義）
pub mod ports;

/// 標準アダプタ（ポートの std 実装）
pub mod adapter;

/// Run ID 生成（固定長・辞書順＝時系列）
pub mod run_id;
