use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");
const ADD_TRANSACTION_REVIEW_SQL: &str = include_str!("migrations/0002_transaction_review.sql");

pub const EXPECTED_USER_VERSION: i64 = 2;

pub const REQUIRED_META_KEYS: [(&str, &str); 2] = [
    ("schema_version", "v1"),
    ("ingest_contract_version", "v1"),
];

pub const REQUIRED_INDEX_NAMES: [&str; 4] = [
    "idx_transactions_user_vendor",
    "idx_transactions_user_posted_at",
    "idx_transactions_user_reviewed",
    "idx_api_tokens_user_id",
];

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        M::up(BOOTSTRAP_SQL),
        M::up(ADD_TRANSACTION_REVIEW_SQL),
    ])
}

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    migrations().to_latest(conn)
}
