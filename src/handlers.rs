use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    AppState,
    booking::book,
    error::{ApiError, BookingError},
    models::{BookingDetailsView, BookingRequest, BookingView, ClassView, NewClassRequest},
    query::{booking_view, class_view, list_bookings_by_email, list_classes},
    validation::{
        resolve_timezone, validate_booking_request, validate_lookup_email, validate_new_class,
    },
};

#[derive(Debug, serde::Deserialize)]
pub struct ClassesQuery {
    pub timezone: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
    pub timezone: Option<String>,
}

fn rejected(err: BookingError) -> ApiError {
    if !matches!(err, BookingError::Store(_)) {
        warn!("Rejected request: {err}");
    }
    err.into()
}

#[utoipa::path(get, path = "/", tag = "booking")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Fitness Studio Booking API",
        "endpoints": {
            "/api/classes": "List classes (GET) or create one (POST)",
            "/api/book": "Book a slot in a class",
            "/api/bookings": "List bookings for an email address"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "booking")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 500, description = "Store unreachable")
    ),
    tag = "booking"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.store.ping().await?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

#[utoipa::path(
    get,
    path = "/api/classes",
    params(
        ("timezone" = Option<String>, Query, description = "IANA timezone for date_time, e.g. America/New_York")
    ),
    responses(
        (status = 200, description = "All scheduled classes", body = [ClassView]),
        (status = 400, description = "Unknown timezone")
    ),
    tag = "booking"
)]
pub async fn get_classes(
    State(state): State<AppState>,
    Query(query): Query<ClassesQuery>,
) -> Result<Json<Vec<ClassView>>, ApiError> {
    let tz = resolve_timezone(query.timezone.as_deref(), state.default_tz).map_err(rejected)?;
    let classes = list_classes(state.store.as_ref(), tz)
        .await
        .map_err(rejected)?;
    Ok(Json(classes))
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = NewClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassView),
        (status = 400, description = "Invalid class definition")
    ),
    tag = "booking"
)]
pub async fn create_class(
    State(state): State<AppState>,
    payload: Result<Json<NewClassRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let class = validate_new_class(&request, state.default_tz, Utc::now()).map_err(rejected)?;
    state
        .store
        .insert_class(&class)
        .await
        .map_err(|err| rejected(err.into()))?;

    info!(class_id = %class.id, "class created");
    Ok((StatusCode::CREATED, Json(class_view(&class, state.default_tz))))
}

#[utoipa::path(
    post,
    path = "/api/book",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingView),
        (status = 400, description = "Invalid request, or the class cannot be booked")
    ),
    tag = "booking"
)]
pub async fn book_class(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let request = validate_booking_request(&request).map_err(rejected)?;
    let booking = book(state.store.as_ref(), request, Utc::now())
        .await
        .map_err(rejected)?;
    Ok((
        StatusCode::CREATED,
        Json(booking_view(&booking, state.default_tz)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        ("email" = String, Query, description = "Client email address"),
        ("timezone" = Option<String>, Query, description = "IANA timezone for timestamps")
    ),
    responses(
        (status = 200, description = "Bookings for the email, possibly empty", body = [BookingDetailsView]),
        (status = 400, description = "Missing or invalid email, or unknown timezone")
    ),
    tag = "booking"
)]
pub async fn get_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingDetailsView>>, ApiError> {
    let email = validate_lookup_email(query.email.as_deref()).map_err(rejected)?;
    let tz = resolve_timezone(query.timezone.as_deref(), state.default_tz).map_err(rejected)?;
    let bookings = list_bookings_by_email(state.store.as_ref(), email, tz)
        .await
        .map_err(rejected)?;
    Ok(Json(bookings))
}
