use crate::error::BookingError;
use crate::types::{
    Appointment, AppointmentStatus, AvailabilityRule, ConsultationType, NewAppointment,
    NewAvailabilityRule, NewConsultationType,
};
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

/// Storage seam of the booking core. Handlers receive an
/// implementation through `AppState` instead of touching a shared
/// store directly, so tests can swap in doubles.
pub trait BookingBackend: Clone + Send + Sync + 'static {
    fn services(&self) -> Result<Vec<ConsultationType>, BookingError>;

    /// Enabled rule for a weekday (0 = Sunday). When several enabled
    /// rules exist for one weekday the lowest id wins.
    fn rule_for_weekday(&self, day_of_week: i16) -> Result<Option<AvailabilityRule>, BookingError>;

    /// Times of non-cancelled appointments on the date.
    fn booked_times(&self, date: NaiveDate) -> Result<Vec<NaiveTime>, BookingError>;

    /// Creates an appointment after re-checking, atomically with the
    /// write, that the slot is offered and still free. At most one
    /// active appointment may ever exist per (date, time).
    fn book_appointment(&self, request: NewAppointment) -> Result<Appointment, BookingError>;

    fn appointments(&self, date: Option<NaiveDate>) -> Result<Vec<Appointment>, BookingError>;

    /// Status transition. Moving out of CANCELLED re-checks the slot,
    /// since it may have been re-booked in the meantime.
    fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, BookingError>;

    fn rules(&self) -> Result<Vec<AvailabilityRule>, BookingError>;
    fn add_rule(&self, rule: NewAvailabilityRule) -> Result<AvailabilityRule, BookingError>;
    fn remove_rule(&self, id: i32) -> Result<(), BookingError>;

    fn add_service(&self, service: NewConsultationType) -> Result<ConsultationType, BookingError>;
    fn remove_service(&self, id: i32) -> Result<(), BookingError>;
}

/// Shared sanity check for incoming rules, used by both stores.
pub fn validate_rule(rule: &NewAvailabilityRule) -> Result<(), BookingError> {
    if !(0..=6).contains(&rule.day_of_week) {
        return Err(BookingError::InvalidRule("Jour de semaine invalide".into()));
    }
    if rule.end_time <= rule.start_time {
        return Err(BookingError::InvalidRule("Horaires invalides".into()));
    }
    if rule.slot_duration < 1 {
        return Err(BookingError::InvalidRule("Durée de créneau invalide".into()));
    }
    if rule.break_between < 0 {
        return Err(BookingError::InvalidRule("Pause invalide".into()));
    }
    Ok(())
}
