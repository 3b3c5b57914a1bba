//! Landing page.

use axum::{extract::State, response::Response};
use domain::models::reservation::ReservationTab;
use domain::models::{ReservationDetails, ReservationStatus};
use persistence::repositories::ReservationRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Flash};
use crate::templates::{render_page, HomePage, Layout, ReservationRow};

/// Upcoming reservations shown on the landing page.
const UPCOMING_LIMIT: usize = 5;

/// GET /
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
) -> Result<Response, ApiError> {
    let today = state.config.club.today();
    let upcoming: Vec<ReservationRow> = ReservationRepository::new(state.pool.clone())
        .list_for_customer(current.user.id, ReservationTab::Future, today)
        .await?
        .into_iter()
        .map(ReservationDetails::from)
        .filter(|r| r.status == ReservationStatus::Booked)
        .take(UPCOMING_LIMIT)
        .map(|r| ReservationRow::from(&r))
        .collect();

    let page = HomePage {
        layout: Layout::new(&state, Some(&current.user), &flash),
        name: current.user.label().to_string(),
        is_coach: current.user.is_coach(),
        upcoming,
    };
    render_page(&page, &flash, &state.cookies)
}
