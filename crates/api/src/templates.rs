//! Askama page templates and the helpers that turn them into responses.

use askama::Template;
use axum::{
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use domain::models::availability::AvailabilityForm;
use domain::models::reservation::ReservationForm;
use domain::models::{AvailabilitySlot, FormErrors, ReservationDetails, ReservationStatus, User};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Flash;
use crate::services::flash::{self, FlashMessage};
use crate::services::CookieHelper;

/// Signed-in user as shown in the navigation bar.
#[derive(Debug, Clone)]
pub struct NavUser {
    pub name: String,
    pub is_coach: bool,
}

/// Data every page passes to `base.html`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub club_name: String,
    pub user: Option<NavUser>,
    pub messages: Vec<FlashMessage>,
}

impl Layout {
    pub fn new(state: &AppState, user: Option<&User>, flash: &Flash) -> Self {
        Self {
            club_name: state.config.club.name.clone(),
            user: user.map(|u| NavUser {
                name: u.label().to_string(),
                is_coach: u.is_coach(),
            }),
            messages: flash.messages.clone(),
        }
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = !current.is_empty() && value == current;
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

/// A reservation formatted for a table row.
#[derive(Debug, Clone)]
pub struct ReservationRow {
    pub id: Uuid,
    pub date: String,
    pub time: String,
    pub court: String,
    pub coach: String,
    pub customer: String,
    pub status: &'static str,
    pub cancellable: bool,
}

impl From<&ReservationDetails> for ReservationRow {
    fn from(r: &ReservationDetails) -> Self {
        Self {
            id: r.id,
            date: r.date.format("%Y-%m-%d").to_string(),
            time: format!("{}-{}", r.start_time.format("%H:%M"), r.end_time.format("%H:%M")),
            court: r.court_name.clone(),
            coach: r.coach_name.clone().unwrap_or_else(|| "-".to_string()),
            customer: r.customer_name.clone(),
            status: r.status.as_str(),
            cancellable: r.status == ReservationStatus::Booked,
        }
    }
}

/// An availability window formatted for the coach's list.
#[derive(Debug, Clone)]
pub struct SlotRow {
    pub id: Uuid,
    pub date: String,
    pub time: String,
    pub status: &'static str,
    pub capacity: i32,
    pub booked: i64,
    pub remaining: i64,
}

impl From<&AvailabilitySlot> for SlotRow {
    fn from(slot: &AvailabilitySlot) -> Self {
        let w = &slot.availability;
        Self {
            id: w.id,
            date: w.date.format("%Y-%m-%d").to_string(),
            time: format!("{}-{}", w.start_time.format("%H:%M"), w.end_time.format("%H:%M")),
            status: w.status.as_str(),
            capacity: w.capacity,
            booked: slot.booked,
            remaining: slot.remaining(),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub layout: Layout,
    pub name: String,
    pub is_coach: bool,
    pub upcoming: Vec<ReservationRow>,
}

#[derive(Template)]
#[template(path = "reservations/new.html")]
pub struct ReservationNewPage {
    pub layout: Layout,
    pub form: ReservationForm,
    pub courts: Vec<SelectOption>,
    pub coaches: Vec<SelectOption>,
    pub errors: FormErrors,
    pub day: String,
    pub day_reservations: Vec<ReservationRow>,
}

impl ReservationNewPage {
    pub fn day_label(date: NaiveDate) -> String {
        date.format("%Y-%m-%d (%a)").to_string()
    }
}

#[derive(Template)]
#[template(path = "reservations/list.html")]
pub struct ReservationListPage {
    pub layout: Layout,
    pub tab: &'static str,
    pub reservations: Vec<ReservationRow>,
}

#[derive(Template)]
#[template(path = "availability/new.html")]
pub struct AvailabilityNewPage {
    pub layout: Layout,
    pub form: AvailabilityForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "availability/list.html")]
pub struct AvailabilityListPage {
    pub layout: Layout,
    pub show_all: bool,
    pub slots: Vec<SlotRow>,
}

#[derive(Template)]
#[template(path = "calendar.html")]
pub struct CalendarPage {
    pub layout: Layout,
    pub coaches: Vec<SelectOption>,
    pub initial_view: String,
    pub slot_min_time: String,
    pub slot_max_time: String,
}

/// Standalone error page; rendered without the layout so it never needs
/// the session or the database.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub title: &'static str,
    pub message: String,
}

/// Renders a page and clears the flash cookie when its messages were shown.
pub fn render_page<T: Template>(
    page: &T,
    flash: &Flash,
    cookies: &CookieHelper,
) -> Result<Response, ApiError> {
    let body = page.render()?;
    let mut response = Html(body).into_response();
    if flash.present {
        CookieHelper::append(
            response.headers_mut(),
            &cookies.build_clear_flash_cookie(),
        );
    }
    Ok(response)
}

/// 303 redirect carrying one flash message for the next page.
pub fn redirect_with_flash(cookies: &CookieHelper, to: &str, message: FlashMessage) -> Response {
    let mut headers = HeaderMap::new();
    CookieHelper::append(
        &mut headers,
        &cookies.build_flash_cookie(&flash::encode(&[message])),
    );
    (headers, Redirect::to(to)).into_response()
}
