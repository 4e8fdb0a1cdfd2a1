//! 結合テスト（実ファイルストア + フェイクリモート）

mod support;

mod insight_tests;
mod store_tests;
