use std::sync::Arc;

use super::model::{Calendar, EventView};
use super::render::render_calendar;
use crate::error::AppResult;
use crate::infrastructure::repositories::EventRepository;

pub struct CalendarService {
    repo: Arc<dyn EventRepository>,
}

impl CalendarService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    /// Active events in display order, optionally for one feed.
    pub async fn list_events(&self, feed_name: Option<&str>) -> AppResult<Vec<EventView>> {
        let events = self.repo.find_active(feed_name).await?;
        Ok(events.into_iter().map(EventView::from).collect())
    }

    pub async fn calendar(&self) -> AppResult<Calendar> {
        Ok(Calendar::from_events(self.list_events(None).await?))
    }

    pub async fn calendar_page(&self) -> AppResult<String> {
        Ok(render_calendar(&self.calendar().await?))
    }
}
