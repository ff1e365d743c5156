use crate::backend::BookingBackend;
use crate::configuration::Configuration;
use crate::error::BookingError;
use crate::slots;
use crate::types::{
    hhmm, Appointment, AvailabilityRule, ConsultationType, NewAppointment, NewAvailabilityRule,
    NewConsultationType, Slot,
};
use crate::AppState;
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref TIME_RE: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotsQuery {
    date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotsResponse {
    slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct BookingRequest {
    #[serde(default)]
    date: String,
    #[serde(default)]
    #[validate(regex(path = *TIME_RE, message = "Heure invalide"))]
    time: String,
    #[serde(default)]
    service_id: i32,
    #[serde(default)]
    #[validate(length(min = 1, message = "Nom requis"))]
    customer_name: String,
    #[serde(default)]
    #[validate(email(message = "Email invalide"))]
    customer_email: String,
    #[serde(default)]
    customer_phone: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppointmentsQuery {
    date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UpdateStatusRequest {
    id: Uuid,
    status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct AddRuleRequest {
    #[validate(range(min = 0, max = 6, message = "Jour de semaine invalide"))]
    day_of_week: i16,
    #[serde(default)]
    #[validate(regex(path = *TIME_RE, message = "Heure invalide"))]
    start_time: String,
    #[serde(default)]
    #[validate(regex(path = *TIME_RE, message = "Heure invalide"))]
    end_time: String,
    #[validate(range(min = 1, message = "Durée de créneau invalide"))]
    slot_duration: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Pause invalide"))]
    break_between: i32,
    enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct AddServiceRequest {
    #[validate(length(min = 1, message = "Nom requis"))]
    name: String,
    #[serde(default)]
    description: String,
    #[validate(range(min = 1, message = "Durée invalide"))]
    duration_minutes: i32,
    price_cents: Option<i64>,
    enabled: bool,
    #[serde(default)]
    sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RemoveByIdRequest {
    id: i32,
}

pub async fn start_server<B: BookingBackend, C: Configuration>(state: AppState<B, C>) {
    let address = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap();
    tracing::info!(%address, "consultation booking service listening");
    axum::serve(listener, app(state)).await.unwrap();
}

pub fn app<B: BookingBackend, C: Configuration>(state: AppState<B, C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/consultations/services", get(get_services))
        .route("/consultations/slots", get(get_slots))
        .route("/consultations/book", post(book_consultation));

    let admin = Router::new()
        .route("/admin/appointments", get(list_appointments))
        .route("/admin/appointments/status", post(update_appointment_status))
        .route("/admin/rules", get(get_rules))
        .route("/admin/rules/add", post(add_rule))
        .route("/admin/rules/remove", post(remove_rule))
        .route("/admin/services/add", post(add_service))
        .route("/admin/services/remove", post(remove_service))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<B, C>,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(cors)
}

async fn admin_auth<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    match request.headers().get("x-admin-password") {
        Some(header) if header.to_str().unwrap_or("") == state.config.admin_password() => {
            Ok(next.run(request).await)
        }
        Some(_) => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Non autorisé" })),
        )),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Identifiants requis" })),
        )),
    }
}

/// Runs the `validator` derives of a payload and surfaces the first
/// field message as a 400.
fn check_payload<T: Validate>(payload: &T) -> Result<(), BookingError> {
    payload.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|field_errors| field_errors.iter())
            .filter_map(|error| error.message.as_ref())
            .map(|message| message.to_string())
            .next()
            .unwrap_or_else(|| "Requête invalide".into());
        BookingError::InvalidPayload(message)
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| BookingError::MissingDate)
}

fn parse_time(raw: &str) -> Result<NaiveTime, BookingError> {
    NaiveTime::parse_from_str(raw, hhmm::FORMAT)
        .map_err(|_| BookingError::InvalidTime(raw.into()))
}

async fn get_services<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
) -> Result<Json<Vec<ConsultationType>>, BookingError> {
    Ok(Json(state.backend.services()?))
}

async fn get_slots<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, BookingError> {
    let date = query
        .date
        .as_deref()
        .ok_or(BookingError::MissingDate)
        .and_then(parse_date)?;

    let slots = match state.backend.rule_for_weekday(slots::day_of_week(date))? {
        Some(rule) => {
            let booked = state.backend.booked_times(date)?;
            slots::resolve_availability(&slots::candidate_times(&rule), &booked)
        }
        None => Vec::new(),
    };
    Ok(Json(SlotsResponse { slots }))
}

async fn book_consultation<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Appointment>), BookingError> {
    check_payload(&request)?;
    let date = parse_date(&request.date)?;
    let time = parse_time(&request.time)?;

    let appointment = state.backend.book_appointment(NewAppointment {
        date,
        time,
        service_id: request.service_id,
        customer_name: request.customer_name,
        customer_email: request.customer_email,
        customer_phone: request.customer_phone,
        notes: request.notes,
    })?;
    tracing::info!(id = %appointment.id, %date, time = %request.time, "appointment booked");
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn list_appointments<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, BookingError> {
    let date = query.date.as_deref().map(parse_date).transpose()?;
    Ok(Json(state.backend.appointments(date)?))
}

async fn update_appointment_status<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Appointment>, BookingError> {
    let status = request
        .status
        .parse()
        .map_err(|_| BookingError::InvalidStatus(request.status.clone()))?;
    let appointment = state.backend.set_appointment_status(request.id, status)?;
    tracing::info!(id = %appointment.id, status = %appointment.status, "appointment status updated");
    Ok(Json(appointment))
}

async fn get_rules<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
) -> Result<Json<Vec<AvailabilityRule>>, BookingError> {
    Ok(Json(state.backend.rules()?))
}

async fn add_rule<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Json(request): Json<AddRuleRequest>,
) -> Result<(StatusCode, Json<AvailabilityRule>), BookingError> {
    check_payload(&request)?;
    let rule = state.backend.add_rule(NewAvailabilityRule {
        day_of_week: request.day_of_week,
        start_time: parse_time(&request.start_time)?,
        end_time: parse_time(&request.end_time)?,
        slot_duration: request.slot_duration,
        break_between: request.break_between,
        enabled: request.enabled,
    })?;
    Ok((StatusCode::CREATED, Json(rule)))
}

async fn remove_rule<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Json(request): Json<RemoveByIdRequest>,
) -> Result<StatusCode, BookingError> {
    state.backend.remove_rule(request.id)?;
    Ok(StatusCode::OK)
}

async fn add_service<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Json(request): Json<AddServiceRequest>,
) -> Result<(StatusCode, Json<ConsultationType>), BookingError> {
    check_payload(&request)?;
    let service = state.backend.add_service(NewConsultationType {
        name: request.name,
        description: request.description,
        duration_minutes: request.duration_minutes,
        price_cents: request.price_cents,
        enabled: request.enabled,
        sort_order: request.sort_order,
    })?;
    Ok((StatusCode::CREATED, Json(service)))
}

async fn remove_service<B: BookingBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Json(request): Json<RemoveByIdRequest>,
) -> Result<StatusCode, BookingError> {
    state.backend.remove_service(request.id)?;
    Ok(StatusCode::OK)
}
