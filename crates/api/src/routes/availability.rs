//! Coach-only availability management.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use domain::models::availability::AvailabilityForm;
use domain::models::{AvailabilitySlot, CoachAvailability, FormErrors};
use persistence::repositories::{AvailabilityError, AvailabilityRepository};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CoachUser, Flash};
use crate::middleware::metrics::record_availability_created;
use crate::services::FlashMessage;
use crate::templates::{
    redirect_with_flash, render_page, AvailabilityListPage, AvailabilityNewPage, Layout, SlotRow,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Any non-empty value lists past windows too.
    pub all: Option<String>,
}

/// GET /coach/availability/new/
pub async fn new_form(
    State(state): State<AppState>,
    CoachUser(current): CoachUser,
    flash: Flash,
) -> Result<Response, ApiError> {
    let page = AvailabilityNewPage {
        layout: Layout::new(&state, Some(&current.user), &flash),
        form: AvailabilityForm::default(),
        errors: FormErrors::new(),
    };
    render_page(&page, &flash, &state.cookies)
}

/// POST /coach/availability/new/
pub async fn create(
    State(state): State<AppState>,
    CoachUser(current): CoachUser,
    flash: Flash,
    Form(form): Form<AvailabilityForm>,
) -> Result<Response, ApiError> {
    let errors = match form.clean() {
        Ok(new) => {
            let repo = AvailabilityRepository::new(state.pool.clone());
            match repo.create(current.user.id, &new).await {
                Ok(entity) => {
                    let window = CoachAvailability::from(entity);
                    record_availability_created();
                    tracing::info!(
                        availability_id = %window.id,
                        coach_id = %window.coach_id,
                        date = %window.date,
                        range = %new.range,
                        capacity = window.capacity,
                        "Availability created"
                    );
                    return Ok(redirect_with_flash(
                        &state.cookies,
                        "/coach/availability/",
                        FlashMessage::success(format!(
                            "Availability published for {} {}.",
                            window.date.format("%Y-%m-%d"),
                            new.range
                        )),
                    ));
                }
                Err(AvailabilityError::Rule(violation)) => {
                    tracing::info!(coach_id = %current.user.id, "Availability rejected: {}", violation);
                    FormErrors::from_message(violation.to_string())
                }
                Err(AvailabilityError::Database(e)) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    let page = AvailabilityNewPage {
        layout: Layout::new(&state, Some(&current.user), &flash),
        form,
        errors,
    };
    render_page(&page, &flash, &state.cookies)
}

/// GET /coach/availability/
///
/// Upcoming windows by default; `?all=1` includes past ones.
pub async fn list(
    State(state): State<AppState>,
    CoachUser(current): CoachUser,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let show_all = query.all.as_deref().is_some_and(|v| !v.is_empty());
    let from = (!show_all).then(|| state.config.club.today());

    let slots = AvailabilityRepository::new(state.pool.clone())
        .list_for_coach(current.user.id, from)
        .await?
        .into_iter()
        .map(AvailabilitySlot::from)
        .map(|s| SlotRow::from(&s))
        .collect();

    let page = AvailabilityListPage {
        layout: Layout::new(&state, Some(&current.user), &flash),
        show_all,
        slots,
    };
    render_page(&page, &flash, &state.cookies)
}

/// POST /coach/availability/:id/delete/
///
/// Only the owning coach may delete a window. Reservations made against it
/// are kept.
pub async fn delete(
    State(state): State<AppState>,
    CoachUser(current): CoachUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = AvailabilityRepository::new(state.pool.clone());
    let window: CoachAvailability = repo
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Availability not found.".to_string()))?;

    if window.coach_id != current.user.id {
        tracing::warn!(
            availability_id = %id,
            user_id = %current.user.id,
            "Delete attempted on another coach's availability"
        );
        return Err(ApiError::Forbidden(
            "You can only delete your own availability.".to_string(),
        ));
    }

    let message = if repo.delete_for_coach(id, current.user.id).await? {
        tracing::info!(availability_id = %id, "Availability deleted");
        FlashMessage::success("Availability deleted.")
    } else {
        FlashMessage::info("This availability was already deleted.")
    };

    Ok(redirect_with_flash(&state.cookies, "/coach/availability/", message))
}
