//! Calendar page and its JSON event feed.

use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use domain::models::calendar::CalendarQuery;
use domain::models::{AvailabilitySlot, CalendarEvent, User};
use persistence::repositories::{AvailabilityRepository, UserRepository};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::{ApiError, JsonError};
use crate::extractors::{ApiUser, CurrentUser, Flash};
use crate::templates::{render_page, CalendarPage, Layout, SelectOption};

#[derive(Debug, Default, Deserialize)]
pub struct CalendarPageQuery {
    pub coach_id: Option<String>,
}

/// GET /calendar/
pub async fn page(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Query(query): Query<CalendarPageQuery>,
) -> Result<Response, ApiError> {
    let selected = query.coach_id.unwrap_or_default();
    let coaches = UserRepository::new(state.pool.clone())
        .list_coaches()
        .await?
        .into_iter()
        .map(User::from)
        .map(|c| SelectOption::new(c.id.to_string(), c.label(), selected.trim()))
        .collect();

    let club = &state.config.club;
    let page = CalendarPage {
        layout: Layout::new(&state, Some(&current.user), &flash),
        coaches,
        initial_view: club.calendar_initial_view.clone(),
        slot_min_time: club.calendar_slot_min_time.clone(),
        slot_max_time: club.calendar_slot_max_time.clone(),
    };
    render_page(&page, &flash, &state.cookies)
}

/// GET /api/calendar/events/?coach_id=&start=&end=
///
/// Availability windows in `[start, end)` as FullCalendar events. Without a
/// coach filter every coach's windows are returned, titled with the coach.
pub async fn events(
    State(state): State<AppState>,
    ApiUser(_current): ApiUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarEvent>>, JsonError> {
    let range = query
        .resolve(state.config.club.today())
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let with_coach_name = range.coach_id.is_none();
    let events = AvailabilityRepository::new(state.pool.clone())
        .slots_in_range(range.coach_id, range.start, range.end)
        .await?
        .into_iter()
        .map(AvailabilitySlot::from)
        .map(|slot| CalendarEvent::from_slot(&slot, with_coach_name))
        .collect::<Vec<_>>();

    tracing::debug!(
        coach_id = ?range.coach_id,
        start = %range.start,
        end = %range.end,
        count = events.len(),
        "Calendar events served"
    );
    Ok(Json(events))
}
