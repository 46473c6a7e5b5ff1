use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Maximum number of check records retained per link.
pub const RETENTION_LIMIT: i64 = 5;

/// One fetch + diff + summarize result for a link at a point in time. The
/// most recent record's `content_snapshot` is the baseline for the next diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord {
    pub id: String,
    pub link_id: String,
    pub content_snapshot: String,
    pub diff: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl CheckRecord {
    pub fn new(link_id: &str, content_snapshot: String, diff: String, summary: String) -> Self {
        CheckRecord {
            id: Uuid::new_v4().to_string(),
            link_id: link_id.to_string(),
            content_snapshot,
            diff,
            summary,
            created_at: Utc::now(),
        }
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(CheckRecord {
            id: row.try_get("id")?,
            link_id: row.try_get("link_id")?,
            content_snapshot: row.try_get("content_snapshot")?,
            diff: row.try_get("diff")?,
            summary: row.try_get("summary")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub async fn insert(&self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO check_history (id, link_id, content_snapshot, diff, summary, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.id)
        .bind(&self.link_id)
        .bind(&self.content_snapshot)
        .bind(&self.diff)
        .bind(&self.summary)
        .bind(self.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The diff baseline for the next check, if any. Insertion order breaks
    /// ties within one timestamp.
    pub async fn most_recent_for(
        pool: &SqlitePool,
        link_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, link_id, content_snapshot, diff, summary, created_at
             FROM check_history
             WHERE link_id = ?
             ORDER BY created_at DESC, rowid DESC
             LIMIT 1",
        )
        .bind(link_id)
        .fetch_optional(pool)
        .await?;
        row.as_ref().map(Self::from_row).transpose()
    }

    /// Full history for a link, newest first.
    pub async fn list_for(pool: &SqlitePool, link_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, link_id, content_snapshot, diff, summary, created_at
             FROM check_history
             WHERE link_id = ?
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(link_id)
        .fetch_all(pool)
        .await?;
        rows.iter().map(Self::from_row).collect()
    }

    pub async fn count_for(pool: &SqlitePool, link_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM check_history WHERE link_id = ?")
            .bind(link_id)
            .fetch_one(pool)
            .await
    }

    /// Delete every record for `link_id` except the `keep` most recent.
    /// Returns the number of deleted rows.
    pub async fn delete_oldest_excess(
        pool: &SqlitePool,
        link_id: &str,
        keep: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM check_history
             WHERE link_id = ?
               AND id NOT IN (
                   SELECT id FROM check_history
                   WHERE link_id = ?
                   ORDER BY created_at DESC, rowid DESC
                   LIMIT ?
               )",
        )
        .bind(link_id)
        .bind(link_id)
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn insert_n(pool: &SqlitePool, link_id: &str, n: usize) -> Vec<CheckRecord> {
        let mut records = Vec::new();
        for k in 0..n {
            let record = CheckRecord::new(
                link_id,
                format!("snapshot {k}"),
                format!("diff {k}"),
                format!("summary {k}"),
            );
            record.insert(pool).await.unwrap();
            records.push(record);
        }
        records
    }

    #[tokio::test]
    async fn most_recent_is_the_last_insert() {
        let pool = db::memory_pool().await.unwrap();

        assert!(CheckRecord::most_recent_for(&pool, "l1")
            .await
            .unwrap()
            .is_none());

        let records = insert_n(&pool, "l1", 3).await;
        let latest = CheckRecord::most_recent_for(&pool, "l1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, records[2].id);
        assert_eq!(latest.content_snapshot, "snapshot 2");
    }

    #[tokio::test]
    async fn list_is_newest_first_and_scoped_to_link() {
        let pool = db::memory_pool().await.unwrap();

        insert_n(&pool, "l1", 3).await;
        insert_n(&pool, "other", 2).await;

        let history = CheckRecord::list_for(&pool, "l1").await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content_snapshot, "snapshot 2");
        assert_eq!(history[2].content_snapshot, "snapshot 0");
    }

    #[tokio::test]
    async fn retention_keeps_the_newest_records() {
        let pool = db::memory_pool().await.unwrap();

        insert_n(&pool, "l1", 8).await;
        let removed = CheckRecord::delete_oldest_excess(&pool, "l1", RETENTION_LIMIT)
            .await
            .unwrap();
        assert_eq!(removed, 3);

        let history = CheckRecord::list_for(&pool, "l1").await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].content_snapshot, "snapshot 7");
        assert_eq!(history[4].content_snapshot, "snapshot 3");
    }

    #[tokio::test]
    async fn retention_is_a_noop_below_the_limit() {
        let pool = db::memory_pool().await.unwrap();

        insert_n(&pool, "l1", 2).await;
        let removed = CheckRecord::delete_oldest_excess(&pool, "l1", RETENTION_LIMIT)
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(CheckRecord::count_for(&pool, "l1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn retention_does_not_touch_other_links() {
        let pool = db::memory_pool().await.unwrap();

        insert_n(&pool, "l1", 7).await;
        insert_n(&pool, "l2", 2).await;

        CheckRecord::delete_oldest_excess(&pool, "l1", RETENTION_LIMIT)
            .await
            .unwrap();
        assert_eq!(CheckRecord::count_for(&pool, "l1").await.unwrap(), 5);
        assert_eq!(CheckRecord::count_for(&pool, "l2").await.unwrap(), 2);
    }
}
