use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, Transaction};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::event_repository::{EventRepository, KeyMode, ReconciliationTx};
use crate::domain::events::{EventOccurrence, EventRecord, PersistedEvent};
use crate::error::AppResult;
use crate::infrastructure::db::{check_connection, DbPool};

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    feed_name: String,
    link: String,
    description: Option<String>,
    content: Option<String>,
    metadata: JsonValue,
    occurrences: Json<Vec<EventOccurrence>>,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    is_active: bool,
}

impl From<EventRow> for PersistedEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            feed_name: row.feed_name,
            link: row.link,
            description: row.description,
            content: row.content,
            metadata: row.metadata,
            occurrences: row.occurrences.0,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
            is_active: row.is_active,
        }
    }
}

pub struct PgEventRepository {
    pool: Arc<DbPool>,
    key_mode: KeyMode,
}

impl PgEventRepository {
    pub fn new(pool: Arc<DbPool>, key_mode: KeyMode) -> Self {
        Self { pool, key_mode }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn ping(&self) -> AppResult<()> {
        check_connection(&self.pool).await?;
        Ok(())
    }

    async fn begin_pass(&self, feed_name: &str) -> AppResult<Box<dyn ReconciliationTx>> {
        let tx = self.pool.begin().await?;

        Ok(Box::new(PgReconciliationTx {
            tx,
            feed_name: feed_name.to_string(),
            key_mode: self.key_mode,
        }))
    }

    async fn prune_inactive(&self, older_than: DateTime<Utc>) -> AppResult<u64> {
        let pool = self.pool.as_ref();

        let result = sqlx::query(
            r#"
            DELETE FROM events
            WHERE is_active = FALSE AND last_seen < $1
            "#,
        )
        .bind(older_than)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_active(&self, feed_name: Option<&str>) -> AppResult<Vec<PersistedEvent>> {
        let pool = self.pool.as_ref();

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, feed_name, link, description, content, metadata,
                   occurrences, first_seen, last_seen, is_active
            FROM events
            WHERE is_active = TRUE AND ($1::TEXT IS NULL OR feed_name = $1)
            ORDER BY (occurrences -> 0 ->> 'start') ASC NULLS LAST, feed_name, title
            "#,
        )
        .bind(feed_name)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(PersistedEvent::from).collect())
    }
}

struct PgReconciliationTx {
    tx: Transaction<'static, Postgres>,
    feed_name: String,
    key_mode: KeyMode,
}

impl PgReconciliationTx {
    async fn insert(&mut self, record: &EventRecord, seen_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, feed_name, link, description, content,
                                metadata, occurrences, first_seen, last_seen, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9, TRUE)
            ON CONFLICT (title, feed_name)
            DO UPDATE SET
                link = EXCLUDED.link,
                description = EXCLUDED.description,
                content = EXCLUDED.content,
                metadata = EXCLUDED.metadata,
                occurrences = EXCLUDED.occurrences,
                last_seen = EXCLUDED.last_seen,
                is_active = TRUE
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.title)
        .bind(&self.feed_name)
        .bind(&record.link)
        .bind(&record.description)
        .bind(&record.content)
        .bind(&record.metadata)
        .bind(Json(&record.occurrences))
        .bind(seen_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ReconciliationTx for PgReconciliationTx {
    async fn active_titles(&mut self) -> AppResult<HashSet<String>> {
        let titles: Vec<(String,)> = match self.key_mode {
            KeyMode::PerFeed => {
                sqlx::query_as(
                    r#"
                    SELECT title FROM events
                    WHERE feed_name = $1 AND is_active = TRUE
                    "#,
                )
                .bind(&self.feed_name)
                .fetch_all(&mut *self.tx)
                .await?
            }
            KeyMode::TitleOnly => {
                sqlx::query_as("SELECT title FROM events WHERE is_active = TRUE")
                    .fetch_all(&mut *self.tx)
                    .await?
            }
        };

        Ok(titles.into_iter().map(|(title,)| title).collect())
    }

    async fn upsert(&mut self, record: &EventRecord, seen_at: DateTime<Utc>) -> AppResult<()> {
        if self.key_mode == KeyMode::PerFeed {
            return self.insert(record, seen_at).await;
        }

        // One row per title carries the event: the pass's own feed first,
        // then an active row, then the most recently seen.
        let updated: Option<(Uuid,)> = sqlx::query_as(
            r#"
            WITH target AS (
                SELECT id FROM events
                WHERE title = $1
                ORDER BY (feed_name = $2) DESC, is_active DESC, last_seen DESC
                LIMIT 1
                FOR UPDATE
            )
            UPDATE events
            SET feed_name = $2,
                link = $3,
                description = $4,
                content = $5,
                metadata = $6,
                occurrences = $7,
                last_seen = $8,
                is_active = TRUE
            FROM target
            WHERE events.id = target.id
            RETURNING events.id
            "#,
        )
        .bind(&record.title)
        .bind(&self.feed_name)
        .bind(&record.link)
        .bind(&record.description)
        .bind(&record.content)
        .bind(&record.metadata)
        .bind(Json(&record.occurrences))
        .bind(seen_at)
        .fetch_optional(&mut *self.tx)
        .await?;

        match updated {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE events SET is_active = FALSE
                    WHERE title = $1 AND id <> $2 AND is_active = TRUE
                    "#,
                )
                .bind(&record.title)
                .bind(id)
                .execute(&mut *self.tx)
                .await?;
            }
            None => self.insert(record, seen_at).await?,
        }

        Ok(())
    }

    async fn deactivate(&mut self, titles: &[String]) -> AppResult<u64> {
        if titles.is_empty() {
            return Ok(0);
        }

        let result = match self.key_mode {
            KeyMode::PerFeed => {
                sqlx::query(
                    r#"
                    UPDATE events SET is_active = FALSE
                    WHERE feed_name = $1 AND is_active = TRUE AND title = ANY($2)
                    "#,
                )
                .bind(&self.feed_name)
                .bind(titles)
                .execute(&mut *self.tx)
                .await?
            }
            KeyMode::TitleOnly => {
                sqlx::query(
                    r#"
                    UPDATE events SET is_active = FALSE
                    WHERE is_active = TRUE AND title = ANY($1)
                    "#,
                )
                .bind(titles)
                .execute(&mut *self.tx)
                .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
