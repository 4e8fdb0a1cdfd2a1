mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::process;

use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};

use cli::{parse_args, print_completion, ParseOutcome};
use domain::{catalog, date_of_ms, Insight, ProtoCommand, RunResult};
use ports::inbound::UseCaseRunner;
use usecase::EndOutcome;
use wiring::{wire_proto, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, command: ProtoCommand) -> Result<i32, Error> {
        let command_name = cmd_name_for_log(&command);
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started", "cli", "lifecycle")
                .with_field("command", serde_json::json!(command_name)),
        );

        let result: Result<i32, Error> = match command {
            ProtoCommand::Protocols => {
                for p in catalog() {
                    println!("{}", p.id);
                    println!("  {}", p.name);
                    println!("  rule:    {}", p.rule);
                    println!("  failure: {}", p.failure);
                }
                Ok(0)
            }
            ProtoCommand::Start {
                ref protocol_id,
                ref observe,
            } => {
                let run = self
                    .app
                    .lifecycle
                    .start_run(protocol_id, observe.clone())
                    .map_err(Error::from)?;
                println!("Started: {} ({})", run.protocol_name, run.protocol_id);
                if !run.observed_behaviour_ids.is_empty() {
                    println!("Observing: {}", run.observed_behaviour_ids.join(", "));
                }
                println!("Check in once per trading day with `proto checkin`.");
                Ok(0)
            }
            ProtoCommand::Checkin {
                result,
                ref note,
                ref observe,
            } => {
                let active = match self.app.lifecycle.active_run() {
                    Some(run) => run,
                    None => {
                        return Err(Error::invalid_argument(
                            "no active run. Start one with `proto start <protocol-id>`.",
                        ))
                    }
                };
                let run = self
                    .app
                    .lifecycle
                    .add_checkin(&active.id, result, note.clone(), observe.clone())
                    .map_err(Error::from)?;
                match run.display_status() {
                    "failed" => println!(
                        "Violation recorded. The run ended after {} clean day(s).",
                        run.clean_days()
                    ),
                    "completed" => println!(
                        "Protocol completed: {} clean day(s). The rule held.",
                        run.clean_days()
                    ),
                    _ => println!(
                        "Checked in clean. Current streak: {} day(s).",
                        self.app.lifecycle.current_streak()
                    ),
                }
                Ok(0)
            }
            ProtoCommand::End => {
                let active = match self.app.lifecycle.active_run() {
                    Some(run) => run,
                    None => {
                        println!("No active run to end.");
                        return Ok(0);
                    }
                };
                match self.app.lifecycle.end_run(&active.id).map_err(Error::from)? {
                    EndOutcome::Ended(entry) => {
                        println!(
                            "Ended {} after {} clean day(s).",
                            entry.protocol_name, entry.clean_days
                        );
                    }
                    EndOutcome::AlreadyEnded => println!("Run already ended."),
                }
                Ok(0)
            }
            ProtoCommand::Status => {
                match self.app.lifecycle.active_run() {
                    Some(run) => {
                        println!("Protocol: {} ({})", run.protocol_name, run.protocol_id);
                        println!("Started:  {}", date_of_ms(run.started_at_ms));
                        println!("Streak:   {} day(s)", self.app.lifecycle.current_streak());
                        println!("Best run: {} day(s)", self.app.lifecycle.best_run());
                        if !run.observed_behaviour_ids.is_empty() {
                            println!("Observing: {}", run.observed_behaviour_ids.join(", "));
                        }
                    }
                    None => println!("No active protocol. Pick one with `proto protocols`."),
                }
                Ok(0)
            }
            ProtoCommand::History => {
                let history = self.app.lifecycle.run_history();
                if history.is_empty() {
                    println!("No archived runs yet.");
                } else {
                    for entry in &history {
                        println!(
                            "{}  {} .. {}  {}  ({} clean day(s))",
                            entry.protocol_name,
                            date_of_ms(entry.started_at_ms),
                            date_of_ms(entry.ended_at_ms),
                            result_label(entry.result),
                            entry.clean_days
                        );
                        for note in &entry.notes {
                            println!("    {}: {}", note.date, note.text);
                        }
                    }
                }
                Ok(0)
            }
            ProtoCommand::Insights => {
                print_insight("Most common failure day", &self.app.insights.failure_day_distribution());
                print_insight(
                    "Most frequent breaking behaviour",
                    &self.app.insights.most_frequent_breaking_behaviour(),
                );
                print_insight("Longest clean run", &self.app.insights.longest_clean_run());
                print_insight(
                    "Avg days between failures",
                    &self.app.insights.avg_days_between_failures(),
                );
                print_insight(
                    "Distinct protocols attempted",
                    &self.app.insights.distinct_protocols_attempted(),
                );
                Ok(0)
            }
            ProtoCommand::Reset { wipe } => {
                self.app.lifecycle.clear_active_protocol().map_err(Error::from)?;
                if wipe {
                    self.app.local.clear_local_app_keys()?;
                    println!("Active run dropped and local data wiped.");
                } else {
                    println!("Active run dropped. History is untouched.");
                }
                Ok(0)
            }
        };

        let code = result.as_ref().copied().unwrap_or(0);
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command finished", "cli", "lifecycle")
                .with_field("command", serde_json::json!(command_name))
                .with_field("exit_code", serde_json::json!(code)),
        );
        if let Err(ref e) = result {
            let _ = self.app.logger.log(&LogRecord::new(
                LogLevel::Error,
                e.to_string(),
                "cli",
                "error",
            ));
        }
        result
    }
}

fn cmd_name_for_log(cmd: &ProtoCommand) -> &'static str {
    match cmd {
        ProtoCommand::Protocols => "protocols",
        ProtoCommand::Start { .. } => "start",
        ProtoCommand::Checkin { .. } => "checkin",
        ProtoCommand::End => "end",
        ProtoCommand::Status => "status",
        ProtoCommand::History => "history",
        ProtoCommand::Insights => "insights",
        ProtoCommand::Reset { .. } => "reset",
    }
}

fn result_label(result: RunResult) -> &'static str {
    match result {
        RunResult::Completed => "completed",
        RunResult::Failed => "failed",
        RunResult::Ended => "ended",
    }
}

fn print_insight<T: std::fmt::Display>(label: &str, insight: &Insight<T>) {
    if insight.locked {
        let reason = insight.lock_reason.as_deref().unwrap_or("locked");
        println!("{}: [locked] {}", label, reason);
        return;
    }
    match &insight.value {
        Some(v) => println!("{}: {}", label, v),
        None => println!("{}: not enough data yet", label),
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("proto: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

fn run() -> Result<i32, Error> {
    let command = match parse_args(std::env::args())? {
        ParseOutcome::Command(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
        ParseOutcome::HelpShown => return Ok(0),
    };
    let app = wire_proto()?;
    let runner = Runner { app };
    runner.run(command)
}
