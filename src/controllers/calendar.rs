use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::calendar::{CalendarService, EventView};
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub feed: Option<String>,
}

pub struct CalendarController {
    calendar_service: Arc<CalendarService>,
}

impl CalendarController {
    pub fn new(calendar_service: Arc<CalendarService>) -> Self {
        Self { calendar_service }
    }

    /// GET /api/events - Active events, optionally for one feed
    pub async fn list_events(
        State(controller): State<Arc<CalendarController>>,
        Query(query): Query<EventsQuery>,
    ) -> AppResult<Json<Vec<EventView>>> {
        let feed = query.feed.as_deref().map(str::trim).filter(|f| !f.is_empty());
        let events = controller.calendar_service.list_events(feed).await?;
        Ok(Json(events))
    }

    /// GET / - Calendar page
    pub async fn calendar_page(
        State(controller): State<Arc<CalendarController>>,
    ) -> AppResult<Html<String>> {
        let page = controller.calendar_service.calendar_page().await?;
        Ok(Html(page))
    }
}
