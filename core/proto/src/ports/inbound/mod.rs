//! Inbound ポート（プレゼンテーション層 → usecase）

use crate::domain::ProtoCommand;
use common::error::Error;

/// 解析済みコマンドを実行し、終了コードを返す
pub trait UseCaseRunner {
    fn run(&self, command: ProtoCommand) -> Result<i32, Error>;
}
