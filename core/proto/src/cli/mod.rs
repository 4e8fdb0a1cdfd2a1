//! CLI 入力層

mod args;

pub use args::{parse_args, print_completion, ParseOutcome};
