use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, security_headers_middleware, trace_id};
use crate::routes::{auth, availability, calendar, health, home, reservations};
use crate::services::{AuthService, CookieHelper};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub cookies: CookieHelper,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        let cookies = CookieHelper::new(config.session.clone());
        Self {
            pool,
            config: Arc::new(config),
            cookies,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.pool.clone(), self.config.session.ttl_hours)
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let state = AppState::new(config, pool);
    let config = Arc::clone(&state.config);

    let pages = Router::new()
        .route("/", get(home::index))
        .route("/login/", get(auth::login_form).post(auth::login))
        .route("/logout/", get(auth::logout))
        .route(
            "/reservations/new/",
            get(reservations::new_form).post(reservations::create),
        )
        .route("/reservations/", get(reservations::list))
        .route("/reservations/:id/cancel/", post(reservations::cancel))
        .route(
            "/coach/availability/new/",
            get(availability::new_form).post(availability::create),
        )
        .route("/coach/availability/", get(availability::list))
        .route(
            "/coach/availability/:id/delete/",
            post(availability::delete),
        )
        .route("/calendar/", get(calendar::page))
        .route("/api/calendar/events/", get(calendar::events));

    let probes = Router::new()
        .route("/healthz/", get(health::live))
        .route("/healthz/ready/", get(health::ready))
        .route("/metrics", get(metrics_handler));

    let router = Router::new()
        .merge(pages)
        .merge(probes)
        .with_state(state);

    with_middleware(router, &config)
}

/// Wraps a router in the global middleware stack.
pub fn with_middleware(router: Router, config: &Config) -> Router {
    let hsts_enabled = config.session.secure;
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    router
        // Global middleware (order matters: bottom layers run first)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(
            hsts_enabled,
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
}

/// Answers a handler panic with the generic 500 page. The detail is only logged.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}
