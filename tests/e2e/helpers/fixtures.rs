use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tpl_event_monitor::domain::events::EventOccurrence;
use uuid::Uuid;

pub struct TestFixtures {
    pool: PgPool,
}

/// A row to seed into the `events` table.
pub struct EventFixture {
    pub title: String,
    pub feed_name: String,
    pub occurrences: Vec<EventOccurrence>,
    pub is_active: bool,
    pub last_seen: DateTime<Utc>,
}

impl EventFixture {
    pub fn new(feed_name: &str, title: &str) -> Self {
        Self {
            title: title.to_string(),
            feed_name: feed_name.to_string(),
            occurrences: Vec::new(),
            is_active: true,
            last_seen: Utc::now(),
        }
    }

    /// Add an occurrence on 2025-`month`-`day` at `hour`:00, lasting one hour.
    pub fn on(mut self, month: u32, day: u32, hour: u32) -> Self {
        let start = NaiveDate::from_ymd_opt(2025, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid fixture date");
        self.occurrences.push(EventOccurrence {
            start,
            end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0),
        });
        self
    }

    pub fn inactive_for_days(mut self, days: i64) -> Self {
        self.is_active = false;
        self.last_seen = Utc::now() - Duration::days(days);
        self
    }
}

impl TestFixtures {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_event(&self, fixture: EventFixture) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let first_seen = fixture.last_seen - Duration::days(1);

        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, feed_name, link, description, content,
                metadata, occurrences, first_seen, last_seen, is_active
            )
            VALUES ($1, $2, $3, $4, $5, NULL, '[]'::jsonb, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(&fixture.title)
        .bind(&fixture.feed_name)
        .bind(format!("https://www.torontopubliclibrary.ca/detail.jsp?R={}", id.simple()))
        .bind(format!("<p>{} at the library</p>", fixture.title))
        .bind(Json(&fixture.occurrences))
        .bind(first_seen)
        .bind(fixture.last_seen)
        .bind(fixture.is_active)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn count_events(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Active titles of a feed, sorted.
    pub async fn active_titles(&self, feed_name: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT title FROM events WHERE feed_name = $1 AND is_active = TRUE ORDER BY title",
        )
        .bind(feed_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(title,)| title).collect())
    }

    pub async fn first_seen(&self, feed_name: &str, title: &str) -> Result<DateTime<Utc>> {
        let (first_seen,): (DateTime<Utc>,) = sqlx::query_as(
            "SELECT first_seen FROM events WHERE feed_name = $1 AND title = $2",
        )
        .bind(feed_name)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(first_seen)
    }
}
