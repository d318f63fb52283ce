use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UserCreateData {
    pub user_id: String,
    pub name: String,
    pub token_id: String,
    pub token: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenRevokeData {
    pub token_id: String,
    pub user_id: String,
    pub revoked_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    pub category_id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAddData {
    pub category: CategoryRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListData {
    pub rows: Vec<CategoryRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub rows_read: i64,
    pub rows_valid: i64,
    pub rows_invalid: i64,
    pub inserted: i64,
    pub skipped: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestIssue {
    pub row: i64,
    pub field: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestedRow {
    pub row: i64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_id: Option<String>,
    pub external_id: String,
    pub vendor: String,
    pub display_vendor: String,
    pub category_id: Option<String>,
    pub category_source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestData {
    pub ingest_id: String,
    pub user_id: String,
    pub message: String,
    pub source_used: String,
    pub summary: IngestSummary,
    pub rows: Vec<IngestedRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub txn_id: String,
    pub external_id: String,
    pub vendor: String,
    pub display_vendor: Option<String>,
    pub amount: i64,
    pub posted_at: String,
    pub reviewed: bool,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionListData {
    pub unreviewed_only: bool,
    pub returned: i64,
    pub rows: Vec<TransactionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionReviewData {
    pub transaction: TransactionRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorResolveData {
    pub vendor: String,
    pub display_vendor: String,
    pub resolution: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReportRow {
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub txn_count: i64,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReportData {
    pub from: Option<String>,
    pub to: Option<String>,
    pub txn_count: i64,
    pub total_amount: i64,
    pub rows: Vec<CategoryReportRow>,
}
