//! Booking form, reservation list and cancellation.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use chrono::NaiveDate;
use domain::models::reservation::{
    CancelOutcome, ReservationForm, ReservationPrefill, ReservationTab,
};
use domain::models::{Court, FormErrors, Reservation, ReservationDetails, User};
use domain::services::BookingRuleViolation;
use persistence::repositories::{
    BookingError, CourtRepository, ReservationRepository, UserRepository,
};
use serde::Deserialize;
use shared::time_range::parse_date;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Flash};
use crate::middleware::metrics::{
    record_booking_rejected, record_reservation_cancelled, record_reservation_created,
};
use crate::services::FlashMessage;
use crate::templates::{
    redirect_with_flash, render_page, Layout, ReservationListPage, ReservationNewPage,
    ReservationRow, SelectOption,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub tab: Option<String>,
}

/// Builds the booking page for a form state and the day whose bookings are
/// listed under it.
async fn booking_page(
    state: &AppState,
    user: &User,
    flash: &Flash,
    form: ReservationForm,
    errors: FormErrors,
    day: NaiveDate,
) -> Result<ReservationNewPage, ApiError> {
    let courts = CourtRepository::new(state.pool.clone())
        .list_active()
        .await?
        .into_iter()
        .map(Court::from)
        .map(|c| SelectOption::new(c.id.to_string(), c.name, form.court.trim()))
        .collect();

    let coaches = UserRepository::new(state.pool.clone())
        .list_coaches()
        .await?
        .into_iter()
        .map(User::from)
        .map(|c| SelectOption::new(c.id.to_string(), c.label(), form.coach.trim()))
        .collect();

    let day_reservations = ReservationRepository::new(state.pool.clone())
        .list_booked_on_date(day)
        .await?
        .into_iter()
        .map(ReservationDetails::from)
        .map(|r| ReservationRow::from(&r))
        .collect();

    Ok(ReservationNewPage {
        layout: Layout::new(state, Some(user), flash),
        form,
        courts,
        coaches,
        errors,
        day: ReservationNewPage::day_label(day),
        day_reservations,
    })
}

/// Form field a rule violation belongs to, if any.
fn violation_field(violation: &BookingRuleViolation) -> Option<&'static str> {
    match violation {
        BookingRuleViolation::CoachNotFound => Some("coach"),
        BookingRuleViolation::CourtNotFound => Some("court"),
        _ => None,
    }
}

fn violation_errors(violation: &BookingRuleViolation) -> FormErrors {
    let mut errors = FormErrors::new();
    match violation_field(violation) {
        Some(field) => errors.add(field, violation.to_string()),
        None => errors.add_non_field(violation.to_string()),
    }
    errors
}

/// GET /reservations/new/
///
/// `coach`, `date`, `start` and `end` query parameters pre-fill the form,
/// which is how calendar events link here.
pub async fn new_form(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Query(prefill): Query<ReservationPrefill>,
) -> Result<Response, ApiError> {
    let form = ReservationForm::from_prefill(&prefill);
    let day = parse_date(&form.date).unwrap_or_else(|_| state.config.club.today());

    let page = booking_page(&state, &current.user, &flash, form, FormErrors::new(), day).await?;
    render_page(&page, &flash, &state.cookies)
}

/// POST /reservations/new/
///
/// Rule violations re-render the form with the message; success redirects
/// to the reservation list.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Form(form): Form<ReservationForm>,
) -> Result<Response, ApiError> {
    let errors = match form.clean() {
        Ok(new) => {
            let repo = ReservationRepository::new(state.pool.clone());
            match repo.create_booking(current.user.id, &new).await {
                Ok(entity) => {
                    let reservation = Reservation::from(entity);
                    record_reservation_created();
                    tracing::info!(
                        reservation_id = %reservation.id,
                        customer_id = %reservation.customer_id,
                        court_id = %reservation.court_id,
                        date = %reservation.date,
                        range = %new.range,
                        "Reservation created"
                    );
                    return Ok(redirect_with_flash(
                        &state.cookies,
                        "/reservations/",
                        FlashMessage::success(format!(
                            "Reservation created for {} {}.",
                            reservation.date.format("%Y-%m-%d"),
                            new.range
                        )),
                    ));
                }
                Err(BookingError::Rule(violation)) => {
                    record_booking_rejected(violation.reason());
                    tracing::info!(
                        customer_id = %current.user.id,
                        reason = violation.reason(),
                        "Booking rejected"
                    );
                    violation_errors(&violation)
                }
                Err(BookingError::Database(e)) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    let day = parse_date(&form.date).unwrap_or_else(|_| state.config.club.today());
    let page = booking_page(&state, &current.user, &flash, form, errors, day).await?;
    render_page(&page, &flash, &state.cookies)
}

/// GET /reservations/?tab=future|past
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let tab = ReservationTab::parse(query.tab.as_deref());
    let reservations = ReservationRepository::new(state.pool.clone())
        .list_for_customer(current.user.id, tab, state.config.club.today())
        .await?
        .into_iter()
        .map(ReservationDetails::from)
        .map(|r| ReservationRow::from(&r))
        .collect();

    let page = ReservationListPage {
        layout: Layout::new(&state, Some(&current.user), &flash),
        tab: tab.as_str(),
        reservations,
    };
    render_page(&page, &flash, &state.cookies)
}

/// POST /reservations/:id/cancel/
///
/// Owner only. Cancelling twice is not an error; the second request just
/// reports that nothing changed.
pub async fn cancel(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = ReservationRepository::new(state.pool.clone());
    let reservation: Reservation = repo
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Reservation not found.".to_string()))?;

    if !reservation.is_owned_by(current.user.id) {
        tracing::warn!(
            reservation_id = %id,
            user_id = %current.user.id,
            "Cancel attempted by non-owner"
        );
        return Err(ApiError::Forbidden(
            "You can only cancel your own reservations.".to_string(),
        ));
    }

    let outcome = repo.cancel(id).await?;
    let message = match outcome {
        CancelOutcome::Cancelled => {
            record_reservation_cancelled();
            tracing::info!(reservation_id = %id, "Reservation cancelled");
            FlashMessage::success(outcome.message())
        }
        CancelOutcome::AlreadyCancelled => FlashMessage::info(outcome.message()),
    };

    Ok(redirect_with_flash(&state.cookies, "/reservations/", message))
}
