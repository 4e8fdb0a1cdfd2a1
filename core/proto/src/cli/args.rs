//! 引数解析（clap builder）
//!
//! 解析結果はドメインの ProtoCommand へ変換し、dispatch は main に集約する。

use crate::domain::{CheckinResult, ProtoCommand};
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;

/// 解析結果: 通常のコマンド / 補完スクリプト生成 / ヘルプ表示済み
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Command(ProtoCommand),
    GenerateCompletion(Shell),
    /// ヘルプ・バージョンを表示した（そのまま正常終了する）
    HelpShown,
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("proto")
        .about("Single-protocol trading discipline tracker")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(clap::Command::new("protocols").about("List the protocol catalog"))
        .subcommand(
            clap::Command::new("start")
                .about("Activate a protocol and start a run")
                .arg(
                    clap::Arg::new("protocol")
                        .value_name("protocol-id")
                        .help("Protocol id from `proto protocols`")
                        .required(true),
                )
                .arg(
                    clap::Arg::new("observe")
                        .long("observe")
                        .value_name("behaviour-id")
                        .help("Track a secondary behaviour during this run (Pro, up to 2)")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            clap::Command::new("checkin")
                .about("Record today's check-in for the active run")
                .arg(
                    clap::Arg::new("violated")
                        .long("violated")
                        .help("Report a protocol violation (ends the run immediately)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    clap::Arg::new("note")
                        .short('n')
                        .long("note")
                        .value_name("text")
                        .help("Optional note for this check-in")
                        .num_args(1),
                )
                .arg(
                    clap::Arg::new("observe")
                        .long("observe")
                        .value_name("behaviour-id")
                        .help("Log an observed behaviour (Pro; never ends the run)")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(clap::Command::new("end").about("End the active run manually (Pro)"))
        .subcommand(clap::Command::new("status").about("Show the active run and current streak"))
        .subcommand(clap::Command::new("history").about("Show archived runs"))
        .subcommand(clap::Command::new("insights").about("Show insight statistics"))
        .subcommand(
            clap::Command::new("reset")
                .about("Drop the active run pointer without archiving")
                .arg(
                    clap::Arg::new("wipe")
                        .long("wipe")
                        .help("Also wipe all locally persisted data")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            clap::Command::new("completions")
                .about("Generate shell completion script")
                .arg(
                    clap::Arg::new("shell")
                        .value_name("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

/// コマンドライン引数を解析する
pub fn parse_args<I, T>(args: I) -> Result<ParseOutcome, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = match build_clap_command().try_get_matches_from(args) {
        Ok(m) => m,
        Err(e)
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind()
                    == clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            let _ = e.print();
            return Ok(ParseOutcome::HelpShown);
        }
        Err(e) => return Err(Error::invalid_argument(e.to_string())),
    };

    let outcome = match matches.subcommand() {
        Some(("protocols", _)) => ParseOutcome::Command(ProtoCommand::Protocols),
        Some(("start", sub)) => ParseOutcome::Command(ProtoCommand::Start {
            protocol_id: sub
                .get_one::<String>("protocol")
                .cloned()
                .unwrap_or_default(),
            observe: sub
                .get_many::<String>("observe")
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default(),
        }),
        Some(("checkin", sub)) => ParseOutcome::Command(ProtoCommand::Checkin {
            result: if sub.get_flag("violated") {
                CheckinResult::Violated
            } else {
                CheckinResult::Clean
            },
            note: sub.get_one::<String>("note").cloned(),
            observe: sub
                .get_many::<String>("observe")
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default(),
        }),
        Some(("end", _)) => ParseOutcome::Command(ProtoCommand::End),
        Some(("status", _)) => ParseOutcome::Command(ProtoCommand::Status),
        Some(("history", _)) => ParseOutcome::Command(ProtoCommand::History),
        Some(("insights", _)) => ParseOutcome::Command(ProtoCommand::Insights),
        Some(("reset", sub)) => ParseOutcome::Command(ProtoCommand::Reset {
            wipe: sub.get_flag("wipe"),
        }),
        Some(("completions", sub)) => match sub.get_one::<Shell>("shell") {
            Some(shell) => ParseOutcome::GenerateCompletion(*shell),
            None => return Err(Error::invalid_argument("missing shell name")),
        },
        _ => ParseOutcome::HelpShown,
    };
    Ok(outcome)
}

/// 補完スクリプトを stdout へ出力する
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "proto", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_with_observe() {
        let outcome = parse_args([
            "proto",
            "start",
            "stop-loss-always",
            "--observe",
            "moved-stop",
        ])
        .unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Command(ProtoCommand::Start {
                protocol_id: "stop-loss-always".to_string(),
                observe: vec!["moved-stop".to_string()],
            })
        );
    }

    #[test]
    fn test_parse_checkin_defaults_to_clean() {
        let outcome = parse_args(["proto", "checkin"]).unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Command(ProtoCommand::Checkin {
                result: CheckinResult::Clean,
                note: None,
                observe: Vec::new(),
            })
        );
    }

    #[test]
    fn test_parse_checkin_violated_with_note() {
        let outcome =
            parse_args(["proto", "checkin", "--violated", "--note", "sized up after a loss"])
                .unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Command(ProtoCommand::Checkin {
                result: CheckinResult::Violated,
                note: Some("sized up after a loss".to_string()),
                observe: Vec::new(),
            })
        );
    }

    #[test]
    fn test_parse_reset_wipe() {
        let outcome = parse_args(["proto", "reset", "--wipe"]).unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Command(ProtoCommand::Reset { wipe: true })
        );
    }

    #[test]
    fn test_unknown_subcommand_is_error() {
        assert!(parse_args(["proto", "frobnicate"]).is_err());
    }
}
