//! ユースケース（アプリケーションサービス）

pub mod insights;
pub mod lifecycle;
pub mod migration;

pub use insights::InsightUseCase;
pub use lifecycle::{EndOutcome, LifecycleUseCase};
pub use migration::{MigrationOutcome, MigrationUseCase};
