//! Vendor display-name resolution and category inference.
//!
//! Every lookup is scoped to a single user; candidates from other users are
//! never read.

mod category;
mod lookup;
pub mod scorer;
mod vendor;

pub use category::{CategoryInference, infer_category, infer_category_detailed};
pub use vendor::{ResolutionSource, VendorResolution, resolve_display_vendor, resolve_vendor};

/// Minimum vendor length (in characters) before prefix fuzzy matching is tried.
pub const DEFAULT_PREFIX_LEN: usize = 5;
pub const DEFAULT_DISPLAY_THRESHOLD: f64 = 0.6;
/// Looser than [`DEFAULT_DISPLAY_THRESHOLD`].
pub const DEFAULT_CATEGORY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    pub prefix_len: usize,
    pub display_threshold: f64,
    pub category_threshold: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            prefix_len: DEFAULT_PREFIX_LEN,
            display_threshold: DEFAULT_DISPLAY_THRESHOLD,
            category_threshold: DEFAULT_CATEGORY_THRESHOLD,
        }
    }
}

/// A prior transaction considered as a match candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCandidate {
    pub vendor: String,
    pub display_vendor: Option<String>,
    pub category_id: Option<String>,
}

impl VendorCandidate {
    /// The name to show for this candidate: its display vendor, else its raw vendor.
    pub fn display_name(&self) -> &str {
        self.display_vendor.as_deref().unwrap_or(&self.vendor)
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use rusqlite::{Connection, params};

    use crate::migrations::run_pending;

    pub(crate) struct TxnSeed {
        user_id: String,
        vendor: String,
        display_vendor: Option<String>,
        category_id: Option<String>,
        reviewed: bool,
    }

    impl TxnSeed {
        pub(crate) fn new(user_id: &str, vendor: &str) -> Self {
            Self {
                user_id: user_id.to_string(),
                vendor: vendor.to_string(),
                display_vendor: None,
                category_id: None,
                reviewed: false,
            }
        }

        pub(crate) fn display(mut self, display_vendor: &str) -> Self {
            self.display_vendor = Some(display_vendor.to_string());
            self
        }

        pub(crate) fn reviewed(mut self, category_id: Option<&str>) -> Self {
            self.reviewed = true;
            self.category_id = category_id.map(str::to_string);
            self
        }
    }

    /// In-memory ledger without foreign key enforcement, so seeds can skip users and categories.
    pub(crate) fn ledger() -> Connection {
        let mut conn = match Connection::open_in_memory() {
            Ok(conn) => conn,
            Err(error) => panic!("in-memory ledger: {error}"),
        };
        if let Err(error) = run_pending(&mut conn) {
            panic!("migrations: {error}");
        }
        if let Err(error) = conn.pragma_update(None, "foreign_keys", "OFF") {
            panic!("foreign_keys pragma: {error}");
        }
        conn
    }

    pub(crate) fn insert_txn(conn: &Connection, seed: TxnSeed) {
        let external_id = format!("ext_{}", ulid::Ulid::new());
        let inserted = conn.execute(
            "INSERT INTO transactions (
                txn_id, user_id, external_id, vendor, display_vendor,
                amount, posted_at, reviewed, category_id, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, -1000, '2026-01-15', ?6, ?7, '0')",
            params![
                format!("txn_{}", ulid::Ulid::new()),
                seed.user_id,
                external_id,
                seed.vendor,
                seed.display_vendor,
                seed.reviewed,
                seed.category_id,
            ],
        );
        assert_eq!(inserted.ok(), Some(1));
    }
}
