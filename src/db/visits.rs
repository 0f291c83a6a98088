//! Page visit recording and simple counts for the dashboard.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{NewPageVisit, PageCount, PageVisit, VisitSummary};

/// Pages reported in the summary
const TOP_PAGES_LIMIT: i64 = 10;

#[derive(Debug, Clone)]
pub struct VisitRepository {
    pool: SqlitePool,
}

impl VisitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, visit: NewPageVisit) -> Result<PageVisit, sqlx::Error> {
        let visit = PageVisit {
            id: Uuid::new_v4().to_string(),
            session_id: visit.session_id,
            page: visit.page,
            user_agent: visit.user_agent,
            referrer: visit.referrer,
            ip_address: visit.ip_address,
            timestamp: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO page_visits (id, session_id, page, user_agent, referrer, ip_address, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&visit.id)
        .bind(&visit.session_id)
        .bind(&visit.page)
        .bind(&visit.user_agent)
        .bind(&visit.referrer)
        .bind(&visit.ip_address)
        .bind(visit.timestamp)
        .execute(&self.pool)
        .await?;

        tracing::debug!(page = %visit.page, session_id = %visit.session_id, "page visit recorded");
        Ok(visit)
    }

    pub async fn summary(&self) -> Result<VisitSummary, sqlx::Error> {
        let (total_visits, unique_sessions): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COUNT(DISTINCT session_id) FROM page_visits")
                .fetch_one(&self.pool)
                .await?;

        let pages = sqlx::query_as::<_, PageCount>(
            r#"
            SELECT page, COUNT(*) AS visits
            FROM page_visits
            GROUP BY page
            ORDER BY visits DESC, page ASC
            LIMIT ?
            "#,
        )
        .bind(TOP_PAGES_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(VisitSummary {
            total_visits,
            unique_sessions,
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, DbConfig};

    async fn test_repo() -> VisitRepository {
        let pool = db::init_pool(Some(DbConfig::in_memory())).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        VisitRepository::new(pool)
    }

    fn visit(session_id: &str, page: &str) -> NewPageVisit {
        NewPageVisit {
            session_id: session_id.to_string(),
            page: page.to_string(),
            user_agent: Some("test-agent".to_string()),
            referrer: None,
            ip_address: Some("127.0.0.1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_summary_of_empty_store() {
        let summary = test_repo().await.summary().await.unwrap();
        assert_eq!(summary.total_visits, 0);
        assert_eq!(summary.unique_sessions, 0);
        assert!(summary.pages.is_empty());
    }

    #[tokio::test]
    async fn test_summary_counts_visits_sessions_and_pages() {
        let repo = test_repo().await;
        repo.record(visit("s1", "/")).await.unwrap();
        repo.record(visit("s1", "/contact")).await.unwrap();
        repo.record(visit("s2", "/")).await.unwrap();

        let summary = repo.summary().await.unwrap();
        assert_eq!(summary.total_visits, 3);
        assert_eq!(summary.unique_sessions, 2);
        assert_eq!(
            summary.pages,
            vec![
                PageCount { page: "/".to_string(), visits: 2 },
                PageCount { page: "/contact".to_string(), visits: 1 },
            ]
        );
    }
}
