use crate::cli::{
    CategoryCommand, Commands, ReportCommand, TokenCommand, TxnCommand, UserCommand, VendorCommand,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::User {
            command: UserCommand::Create { json, .. },
        }
        | Commands::Token {
            command: TokenCommand::Revoke { json },
        }
        | Commands::Category {
            command: CategoryCommand::Add { json, .. } | CategoryCommand::List { json },
        }
        | Commands::Ingest { json, .. }
        | Commands::Txn {
            command: TxnCommand::List { json, .. } | TxnCommand::Review { json, .. },
        }
        | Commands::Vendor {
            command: VendorCommand::Resolve { json, .. },
        }
        | Commands::Report {
            command: ReportCommand::Categories { json, .. },
        } => *json,
    };
    OutputMode::from_flag(json)
}
