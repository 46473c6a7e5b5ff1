use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled link";

/// A monitored URL with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let tags: String = row.try_get("tags")?;
        Ok(Link {
            id: row.try_get("id")?,
            url: row.try_get("url")?,
            title: row.try_get("title")?,
            tags: serde_json::from_str(&tags).unwrap_or_default(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Persist a new link. Callers validate the URL; blank titles fall back
    /// to [`DEFAULT_TITLE`].
    pub async fn create(
        pool: &SqlitePool,
        url: &str,
        title: Option<String>,
        tags: Vec<String>,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let link = Link {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            tags,
            created_at: now,
            updated_at: now,
        };

        let tags_json = serde_json::to_string(&link.tags).unwrap_or_else(|_| "[]".to_string());
        sqlx::query(
            "INSERT INTO links (id, url, title, tags, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&link.id)
        .bind(&link.url)
        .bind(&link.title)
        .bind(&tags_json)
        .bind(link.created_at)
        .bind(link.updated_at)
        .execute(pool)
        .await?;

        Ok(link)
    }

    /// All links, newest first.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, url, title, tags, created_at, updated_at
             FROM links
             ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(pool)
        .await?;
        rows.iter().map(Self::from_row).collect()
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, url, title, tags, created_at, updated_at
             FROM links
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        row.as_ref().map(Self::from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn create_applies_defaults_and_round_trips() {
        let pool = db::memory_pool().await.unwrap();

        let link = Link::create(&pool, "https://example.com", None, vec![])
            .await
            .unwrap();
        assert_eq!(link.title, DEFAULT_TITLE);
        assert_eq!(link.created_at, link.updated_at);

        let loaded = Link::find_by_id(&pool, &link.id).await.unwrap().unwrap();
        assert_eq!(loaded.url, "https://example.com");
        assert_eq!(loaded.title, DEFAULT_TITLE);
        assert!(loaded.tags.is_empty());
    }

    #[tokio::test]
    async fn tags_survive_storage() {
        let pool = db::memory_pool().await.unwrap();

        let link = Link::create(
            &pool,
            "https://example.com/news",
            Some("News".to_string()),
            vec!["press".to_string(), "weekly".to_string()],
        )
        .await
        .unwrap();

        let loaded = Link::find_by_id(&pool, &link.id).await.unwrap().unwrap();
        assert_eq!(loaded.tags, vec!["press", "weekly"]);
        assert_eq!(loaded.title, "News");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let pool = db::memory_pool().await.unwrap();

        let first = Link::create(&pool, "https://one.example", None, vec![])
            .await
            .unwrap();
        let second = Link::create(&pool, "https://two.example", None, vec![])
            .await
            .unwrap();

        let links = Link::list(&pool).await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].id, second.id);
        assert_eq!(links[1].id, first.id);
    }

    #[tokio::test]
    async fn find_unknown_is_none() {
        let pool = db::memory_pool().await.unwrap();
        assert!(Link::find_by_id(&pool, "missing").await.unwrap().is_none());
    }
}
