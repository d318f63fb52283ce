pub mod categories;
pub(crate) mod common;
pub mod ingest;
pub mod report;
pub mod transactions;
pub mod users;
pub mod vendors;
