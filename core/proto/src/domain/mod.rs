//! ドメイン型とドメインアルゴリズム（I/O なし）

mod command;
mod entitlement;
mod error;
mod insight;
mod protocol;
mod run;
mod streak;

pub use command::ProtoCommand;
pub use entitlement::{Account, Tier, UserId};
pub use error::LifecycleError;
pub use insight::Insight;
pub use protocol::{
    behaviours, catalog, find_behaviour, find_protocol, Behaviour, Protocol, DEFAULT_RUN_LENGTH,
    MAX_OBSERVED_BEHAVIOURS,
};
pub use run::{
    date_of_ms, normalize_note, Checkin, CheckinResult, EndReason, Run, RunHistoryEntry, RunNote,
    RunResult, RunStatus,
};
pub use streak::{best_run, current_streak, periods_from_checkins, Period};
