mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use stdout_io::write_stdout_text;
use tallyo_client::ClientError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV_VAR: &str = "TALLYO_LOG";

const ROOT_HELP: &str = "Tallyo - personal finance ledger

Usage:
  tallyo <command>

Start here:
  tallyo user create <name>
  tallyo ingest --help
  tallyo --help
";

const TOP_LEVEL_HELP: &str = "Tallyo - personal finance ledger with learned vendor names and categories

USAGE: tallyo [--token <token>] <command>

Get set up:
  1. tallyo user create <name>                 Create a user and print its bearer token
  2. export TALLYO_TOKEN=<token>               Or pass --token on every command
  3. tallyo category add <name>                Add the categories you want to track

Bring in transactions:
  tallyo ingest --help                         Read the accepted JSON and CSV layouts
  tallyo ingest <path>                         Ingest a file (use `-` for stdin)

Teach tallyo:
  tallyo txn list --unreviewed                 Transactions still waiting for review
  tallyo txn review <txn-id> --category <id>   Confirm a category and display vendor
  tallyo vendor resolve \"<raw vendor>\"         Preview what an ingest would assign

See where the money went:
  tallyo report categories --from <date> --to <date>

Other commands:
  tallyo category list                         List your categories
  tallyo token revoke                          Revoke the token in use

Add --json to any command for machine-readable output.
Set TALLYO_LOG=debug to trace matching decisions on stderr.
";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);
    tracing::debug!(?mode, "dispatching command");

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let text = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if write_stdout_text(&text).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayVersion => {
            if write_stdout_text(&err.to_string()).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        kind => {
            let command_hint = if matches!(
                kind,
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::InvalidSubcommand
            ) {
                command_path_from_args(raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint);
            let mode = infer_requested_output_mode(raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's usage footer so the "What to do next" section is the only guidance.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Maps raw args to the subcommand path used in `--help` hints, e.g. "txn review".
fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    let non_flags: Vec<&str> = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect();

    match non_flags.as_slice() {
        ["user", "create", ..] => Some("user create"),
        ["user", ..] => Some("user"),
        ["token", "revoke", ..] => Some("token revoke"),
        ["token", ..] => Some("token"),
        ["category", "add", ..] => Some("category add"),
        ["category", "list", ..] => Some("category list"),
        ["category", ..] => Some("category"),
        ["ingest", ..] => Some("ingest"),
        ["txn", "list", ..] => Some("txn list"),
        ["txn", "review", ..] => Some("txn review"),
        ["txn", ..] => Some("txn"),
        ["vendor", "resolve", ..] => Some("vendor resolve"),
        ["vendor", ..] => Some("vendor"),
        ["report", "categories", ..] => Some("report categories"),
        ["report", ..] => Some("report"),
        _ => None,
    }
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.is_internal() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

#[cfg(test)]
mod tests {
    use super::{command_path_from_args, strip_clap_boilerplate};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn strips_usage_footer() {
        let message = "error: unexpected argument '--nope' found\n\nUsage: tallyo txn list\n\nFor more information, try '--help'.\n";
        assert_eq!(
            strip_clap_boilerplate(message),
            "error: unexpected argument '--nope' found"
        );
    }

    #[test]
    fn command_path_ignores_flags_and_values() {
        assert_eq!(
            command_path_from_args(&args(&["tallyo", "--json", "txn", "review", "txn_1"])),
            Some("txn review")
        );
        assert_eq!(
            command_path_from_args(&args(&["tallyo", "report", "--from", "2026-01-01"])),
            Some("report")
        );
        assert_eq!(command_path_from_args(&args(&["tallyo", "wat"])), None);
    }
}
