use tallyo_client::commands;
use tallyo_client::commands::transactions::TransactionReviewOptions;
use tallyo_client::commands::users::UserCreateOptions;
use tallyo_client::{ClientResult, SuccessEnvelope};

use crate::cli::{
    CategoryCommand, Cli, Commands, ReportCommand, TokenCommand, TxnCommand, UserCommand,
    VendorCommand,
};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    let token = cli.token.as_deref();
    match &cli.command {
        Commands::User { command } => match command {
            UserCommand::Create { name, label, .. } => {
                commands::users::create_with_options(UserCreateOptions {
                    name: name.clone(),
                    token_label: label.clone(),
                    home_override: None,
                })
            }
        },
        Commands::Token { command } => match command {
            TokenCommand::Revoke { .. } => commands::users::revoke_token(token),
        },
        Commands::Category { command } => match command {
            CategoryCommand::Add { name, .. } => commands::categories::add(name, token),
            CategoryCommand::List { .. } => commands::categories::list(token),
        },
        Commands::Ingest { path, .. } => commands::ingest::run(path.clone(), token),
        Commands::Txn { command } => match command {
            TxnCommand::List {
                unreviewed, limit, ..
            } => commands::transactions::list_with_options(
                commands::transactions::TransactionListOptions {
                    unreviewed_only: *unreviewed,
                    limit: *limit,
                    token: token.map(str::to_string),
                    home_override: None,
                },
            ),
            TxnCommand::Review {
                txn_id,
                category,
                display_vendor,
                ..
            } => commands::transactions::review_with_options(TransactionReviewOptions {
                txn_id: txn_id.clone(),
                category_id: category.clone(),
                display_vendor: display_vendor.clone(),
                token: token.map(str::to_string),
                home_override: None,
            }),
        },
        Commands::Vendor { command } => match command {
            VendorCommand::Resolve { vendor, .. } => commands::vendors::resolve(vendor, token),
        },
        Commands::Report { command } => match command {
            ReportCommand::Categories { from, to, .. } => commands::report::categories(
                from.as_ref().map(|value| value.as_str()),
                to.as_ref().map(|value| value.as_str()),
                token,
            ),
        },
    }
}

