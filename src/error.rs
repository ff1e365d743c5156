use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;

/// Errors surfaced by the booking core. User-facing messages are
/// French to match the storefront; store failures keep their detail
/// for the log and render generically over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The `date` query parameter is missing or unparseable.
    MissingDate,
    /// A time value is not a valid HH:MM wall-clock time.
    InvalidTime(String),
    /// An appointment status string outside the known set.
    InvalidStatus(String),
    /// Rejected availability rule (bad weekday, inverted window, ...).
    InvalidRule(String),
    /// Request payload failed field validation; carries the message of
    /// the first offending field.
    InvalidPayload(String),
    /// Booking referenced a service that does not exist or is disabled.
    UnknownService(i32),
    /// The requested time is not a candidate slot of that day's schedule.
    SlotNotOffered { date: NaiveDate, time: NaiveTime },
    /// An active appointment already holds (date, time).
    SlotTaken { date: NaiveDate, time: NaiveTime },
    AppointmentNotFound(Uuid),
    RuleNotFound(i32),
    ServiceNotFound(i32),
    /// Underlying store failure, message is internal detail.
    Store(String),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingDate
            | Self::InvalidTime(_)
            | Self::InvalidStatus(_)
            | Self::InvalidRule(_)
            | Self::InvalidPayload(_)
            | Self::UnknownService(_)
            | Self::SlotNotOffered { .. } => StatusCode::BAD_REQUEST,
            Self::SlotTaken { .. } => StatusCode::CONFLICT,
            Self::AppointmentNotFound(_) | Self::RuleNotFound(_) | Self::ServiceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Store detail never leaves the server.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingDate => "Date requise".into(),
            Self::InvalidTime(_) => "Heure invalide".into(),
            Self::InvalidStatus(_) => "Statut invalide".into(),
            Self::InvalidRule(message) => message.clone(),
            Self::InvalidPayload(message) => message.clone(),
            Self::UnknownService(_) => "Prestation invalide".into(),
            Self::SlotNotOffered { .. } => "Ce créneau n'est pas proposé".into(),
            Self::SlotTaken { .. } => "Ce créneau n'est plus disponible".into(),
            Self::AppointmentNotFound(_) => "Rendez-vous introuvable".into(),
            Self::RuleNotFound(_) => "Règle de disponibilité introuvable".into(),
            Self::ServiceNotFound(_) => "Prestation introuvable".into(),
            Self::Store(_) => "Erreur serveur".into(),
        }
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate => write!(f, "missing or unparseable date parameter"),
            Self::InvalidTime(raw) => write!(f, "invalid time: {raw}"),
            Self::InvalidStatus(raw) => write!(f, "invalid status: {raw}"),
            Self::InvalidRule(message) => write!(f, "invalid availability rule: {message}"),
            Self::InvalidPayload(message) => write!(f, "invalid payload: {message}"),
            Self::UnknownService(id) => write!(f, "unknown service: {id}"),
            Self::SlotNotOffered { date, time } => {
                write!(f, "{} {} is not an offered slot", date, time.format("%H:%M"))
            }
            Self::SlotTaken { date, time } => {
                write!(f, "{} {} is already booked", date, time.format("%H:%M"))
            }
            Self::AppointmentNotFound(id) => write!(f, "appointment not found: {id}"),
            Self::RuleNotFound(id) => write!(f, "availability rule not found: {id}"),
            Self::ServiceNotFound(id) => write!(f, "service not found: {id}"),
            Self::Store(message) => write!(f, "store error: {message}"),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<diesel::result::Error> for BookingError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed on the store");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(BookingError::MissingDate.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            BookingError::SlotTaken {
                date: NaiveDate::from_ymd_opt(2026, 8, 4).unwrap(),
                time: NaiveTime::from_hms_opt(9, 40, 0).unwrap(),
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BookingError::AppointmentNotFound(Uuid::new_v4()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BookingError::Store("connection refused".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_detail_stays_internal() {
        let err = BookingError::Store("password authentication failed".into());
        assert_eq!(err.public_message(), "Erreur serveur");
        assert!(err.to_string().contains("password authentication failed"));
    }

    #[test]
    fn missing_date_renders_french_message() {
        assert_eq!(BookingError::MissingDate.public_message(), "Date requise");
    }
}
