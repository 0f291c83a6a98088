//! Database Models - structs representing database rows (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw `blocks` row. `content` and `styles` are still JSON text here; the
/// block repository decodes them into typed documents.
#[derive(Debug, Clone, FromRow)]
pub struct BlockRow {
    pub id: i64,
    pub block_type: String,
    pub block_order: i64,
    pub content: String,
    pub styles: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page visit event
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageVisit {
    pub id: String,
    pub session_id: String,
    pub page: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// New page visit for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPageVisit {
    pub session_id: String,
    pub page: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub ip_address: Option<String>,
}

/// Visit count for one page
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PageCount {
    pub page: String,
    pub visits: i64,
}

/// Simple visit counts for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSummary {
    pub total_visits: i64,
    pub unique_sessions: i64,
    pub pages: Vec<PageCount>,
}
