use chrono::NaiveDate;
use clap::{Parser, Subcommand};

pub const TOKEN_ENV_VAR: &str = "TALLYO_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must be a valid calendar date in YYYY-MM-DD format".to_string());
    }
    Ok(IsoDate(value.to_string()))
}

fn parse_positive_limit(value: &str) -> Result<i64, String> {
    match value.parse::<i64>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err("limit must be a positive integer".to_string()),
    }
}

/// Extended help shown after `tallyo ingest --help`.
pub const INGEST_AFTER_HELP: &str = "\
How ingest works:
  Each row gets a display vendor learned from your earlier transactions
  and, when the row has no category, a category learned from transactions
  you have reviewed. Rows are processed in order, so later rows can match
  earlier rows of the same batch.

  Accepted formats:
    JSON  one top-level array of transaction objects
    CSV   one header row with field names

  <path> is a local file path. Use `-` to read stdin explicitly.
  Example: cat rows.json | tallyo ingest -

Fields:
  external_id (required)
    Your bank's transaction id. Rows whose external_id you already ingested
    are skipped, so re-running the same file is safe.

  vendor (required)
    Raw vendor text from the statement, e.g. `AMAZON MKTPL 4921`.

  amount (required)
    Integer minor units. Negative is money out. Example: `-4215` for -42.15.

  posted_at (required)
    Date only, exactly `YYYY-MM-DD`.

  category_id (optional)
    An id from `tallyo category list`. Omit it to let tallyo infer one.

  notes (optional)
    Free text.

Example:
  [
    {\"external_id\": \"bank-1001\", \"vendor\": \"STARBUCKS #123\", \"amount\": -450, \"posted_at\": \"2026-02-01\"}
  ]

  external_id,vendor,amount,posted_at,category_id,notes
  bank-1001,STARBUCKS #123,-450,2026-02-01,,

If a batch has any invalid row, nothing is written. Fix the listed rows and rerun.
";

#[derive(Debug, Parser)]
#[command(
    name = "tallyo",
    version,
    about = "personal finance ledger with learned vendor names and categories",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Bearer token issued by `tallyo user create`
    #[arg(long, global = true, env = TOKEN_ENV_VAR, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create users
    #[command(arg_required_else_help = true)]
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage bearer tokens
    #[command(arg_required_else_help = true)]
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Manage your categories
    #[command(arg_required_else_help = true)]
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Ingest a batch of transactions from JSON or CSV
    #[command(after_long_help = INGEST_AFTER_HELP)]
    Ingest {
        /// Path to a JSON or CSV file (use `-` for stdin)
        path: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List and review transactions
    #[command(arg_required_else_help = true)]
    Txn {
        #[command(subcommand)]
        command: TxnCommand,
    },
    /// Preview vendor resolution
    #[command(arg_required_else_help = true)]
    Vendor {
        #[command(subcommand)]
        command: VendorCommand,
    },
    /// Spending reports
    #[command(arg_required_else_help = true)]
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum UserCommand {
    /// Create a user and print its first bearer token
    Create {
        /// Display name for the user
        name: String,
        /// Label stored with the issued token
        #[arg(long)]
        label: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TokenCommand {
    /// Revoke the token passed with `--token`
    Revoke {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CategoryCommand {
    /// Add a category
    Add {
        /// Category name, unique per user
        name: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List your categories
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TxnCommand {
    /// List transactions, newest first
    List {
        /// Only show transactions that still need review
        #[arg(long)]
        unreviewed: bool,
        /// Maximum rows to return
        #[arg(long, value_parser = parse_positive_limit)]
        limit: Option<i64>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Mark a transaction reviewed
    Review {
        /// Transaction id (e.g. txn_01J...)
        txn_id: String,
        /// Category id to assign
        #[arg(long)]
        category: Option<String>,
        /// Display vendor to assign
        #[arg(long)]
        display_vendor: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum VendorCommand {
    /// Show the display vendor and category an ingest would assign
    Resolve {
        /// Raw vendor text
        vendor: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ReportCommand {
    /// Total spend per category
    Categories {
        /// Start date filter, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// End date filter, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

#[cfg(test)]
mod tests {
    use super::{Commands, TxnCommand, parse_from, parse_iso_date};

    #[test]
    fn parse_command_paths() {
        let cases: [Vec<&str>; 14] = [
            vec!["tallyo", "user", "create", "ada"],
            vec!["tallyo", "user", "create", "ada", "--label", "laptop", "--json"],
            vec!["tallyo", "token", "revoke", "--token", "tly_x"],
            vec!["tallyo", "category", "add", "Groceries"],
            vec!["tallyo", "category", "list", "--json"],
            vec!["tallyo", "ingest", "rows.json"],
            vec!["tallyo", "ingest", "-", "--json"],
            vec!["tallyo", "ingest"],
            vec!["tallyo", "txn", "list", "--unreviewed", "--limit", "5"],
            vec!["tallyo", "txn", "review", "txn_1", "--category", "cat_1"],
            vec!["tallyo", "vendor", "resolve", "AMAZON MKTPL 4921"],
            vec!["tallyo", "report", "categories"],
            vec!["tallyo", "report", "categories", "--from", "2026-01-01", "--to", "2026-01-31"],
            vec!["tallyo", "--token", "tly_x", "category", "list"],
        ];

        for case in cases {
            let parsed = parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse: {case:?}");
        }
    }

    #[test]
    fn token_flag_is_global() {
        let parsed = parse_from(["tallyo", "txn", "list", "--token", "tly_abc"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert_eq!(cli.token.as_deref(), Some("tly_abc"));
            assert!(matches!(
                cli.command,
                Commands::Txn {
                    command: TxnCommand::List { unreviewed: false, .. }
                }
            ));
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_from(["tallyo", "txn", "list", "--limit", "0"]).is_err());
        assert!(parse_from(["tallyo", "report", "categories", "--from", "2026-02-30"]).is_err());
        assert!(parse_from(["tallyo", "guide"]).is_err());
    }

    #[test]
    fn iso_dates_require_full_form() {
        assert!(parse_iso_date("2026-01-05").is_ok());
        assert!(parse_iso_date("2026-1-5").is_err());
    }
}
