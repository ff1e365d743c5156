use crate::backend::BookingBackend;
use crate::configuration::Configuration;
use crate::error::BookingError;
use crate::types::{
    Appointment, AppointmentStatus, AvailabilityRule, ConsultationType, NewAppointment,
    NewAvailabilityRule, NewConsultationType,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};
use uuid::Uuid;

pub struct MockBookingBackendInner {
    pub success: AtomicBool,
    pub calls_to_services: AtomicU64,
    pub calls_to_rule_for_weekday: AtomicU64,
    pub calls_to_booked_times: AtomicU64,
    pub calls_to_book_appointment: AtomicU64,
    pub calls_to_appointments: AtomicU64,
    pub calls_to_set_appointment_status: AtomicU64,
    pub calls_to_rules: AtomicU64,
    pub calls_to_add_rule: AtomicU64,
    pub calls_to_remove_rule: AtomicU64,
    pub calls_to_add_service: AtomicU64,
    pub calls_to_remove_service: AtomicU64,
    pub services: Mutex<Vec<ConsultationType>>,
    pub rule: Mutex<Option<AvailabilityRule>>,
    pub booked: Mutex<Vec<NaiveTime>>,
}

#[derive(Clone)]
pub struct MockBookingBackend(pub Arc<MockBookingBackendInner>);

impl MockBookingBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_services: AtomicU64::default(),
            calls_to_rule_for_weekday: AtomicU64::default(),
            calls_to_booked_times: AtomicU64::default(),
            calls_to_book_appointment: AtomicU64::default(),
            calls_to_appointments: AtomicU64::default(),
            calls_to_set_appointment_status: AtomicU64::default(),
            calls_to_rules: AtomicU64::default(),
            calls_to_add_rule: AtomicU64::default(),
            calls_to_remove_rule: AtomicU64::default(),
            calls_to_add_service: AtomicU64::default(),
            calls_to_remove_service: AtomicU64::default(),
            services: Mutex::default(),
            rule: Mutex::default(),
            booked: Mutex::default(),
        }
    }
}

impl MockBookingBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockBookingBackendInner::new()))
    }

    fn check_success(&self) -> Result<(), BookingError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BookingError::Store("supposed to fail".into())),
        }
    }
}

impl BookingBackend for MockBookingBackend {
    fn services(&self) -> Result<Vec<ConsultationType>, BookingError> {
        self.0.calls_to_services.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(self.0.services.lock().unwrap().clone())
    }

    fn rule_for_weekday(&self, _day_of_week: i16) -> Result<Option<AvailabilityRule>, BookingError> {
        self.0.calls_to_rule_for_weekday.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(self.0.rule.lock().unwrap().clone())
    }

    fn booked_times(&self, _date: NaiveDate) -> Result<Vec<NaiveTime>, BookingError> {
        self.0.calls_to_booked_times.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(self.0.booked.lock().unwrap().clone())
    }

    fn book_appointment(&self, request: NewAppointment) -> Result<Appointment, BookingError> {
        self.0.calls_to_book_appointment.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(Appointment {
            id: Uuid::new_v4(),
            date: request.date,
            time: request.time,
            status: AppointmentStatus::Pending,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_phone: request.customer_phone,
            service_id: request.service_id,
            notes: request.notes,
            created_at: Utc::now(),
        })
    }

    fn appointments(&self, _date: Option<NaiveDate>) -> Result<Vec<Appointment>, BookingError> {
        self.0.calls_to_appointments.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(Vec::new())
    }

    fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        self.0
            .calls_to_set_appointment_status
            .fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(Appointment {
            id,
            date: NaiveDate::from_ymd_opt(2026, 8, 4).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            status,
            customer_name: String::new(),
            customer_email: String::new(),
            customer_phone: String::new(),
            service_id: 1,
            notes: String::new(),
            created_at: Utc::now(),
        })
    }

    fn rules(&self) -> Result<Vec<AvailabilityRule>, BookingError> {
        self.0.calls_to_rules.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(self.0.rule.lock().unwrap().clone().into_iter().collect())
    }

    fn add_rule(&self, rule: NewAvailabilityRule) -> Result<AvailabilityRule, BookingError> {
        self.0.calls_to_add_rule.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(AvailabilityRule {
            id: 1,
            day_of_week: rule.day_of_week,
            start_time: rule.start_time,
            end_time: rule.end_time,
            slot_duration: rule.slot_duration,
            break_between: rule.break_between,
            enabled: rule.enabled,
        })
    }

    fn remove_rule(&self, _id: i32) -> Result<(), BookingError> {
        self.0.calls_to_remove_rule.fetch_add(1, Ordering::SeqCst);
        self.check_success()
    }

    fn add_service(&self, service: NewConsultationType) -> Result<ConsultationType, BookingError> {
        self.0.calls_to_add_service.fetch_add(1, Ordering::SeqCst);
        self.check_success()?;
        Ok(ConsultationType {
            id: 1,
            name: service.name,
            description: service.description,
            duration_minutes: service.duration_minutes,
            price_cents: service.price_cents,
            enabled: service.enabled,
            sort_order: service.sort_order,
        })
    }

    fn remove_service(&self, _id: i32) -> Result<(), BookingError> {
        self.0.calls_to_remove_service.fetch_add(1, Ordering::SeqCst);
        self.check_success()
    }
}

pub const TEST_ADMIN_PASSWORD: &str = "secret";

#[derive(Clone)]
pub struct TestConfiguration;

impl Configuration for TestConfiguration {
    fn bind_address(&self) -> String {
        // Port 0 keeps parallel test servers from colliding.
        "127.0.0.1:0".into()
    }

    fn admin_password(&self) -> String {
        TEST_ADMIN_PASSWORD.into()
    }

    fn database_url(&self) -> Option<String> {
        None
    }
}
