use crate::backend::{validate_rule, BookingBackend};
use crate::error::BookingError;
use crate::slots;
use crate::types::{
    Appointment, AppointmentStatus, AvailabilityRule, ConsultationType, NewAppointment,
    NewAvailabilityRule, NewConsultationType,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory backend used when no database is configured. Every
/// operation takes the single lock once, so the check-then-insert of
/// the booking writer is atomic against concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    services: Vec<ConsultationType>,
    rules: Vec<AvailabilityRule>,
    appointments: HashMap<Uuid, Appointment>,
    next_service_id: i32,
    next_rule_id: i32,
}

impl Inner {
    fn enabled_rule_for(&self, day_of_week: i16) -> Option<&AvailabilityRule> {
        self.rules
            .iter()
            .filter(|rule| rule.enabled && rule.day_of_week == day_of_week)
            .min_by_key(|rule| rule.id)
    }

    fn slot_is_taken(&self, date: NaiveDate, time: NaiveTime, except: Option<Uuid>) -> bool {
        self.appointments.values().any(|appointment| {
            appointment.date == date
                && appointment.time == time
                && appointment.status.occupies_slot()
                && Some(appointment.id) != except
        })
    }
}

impl LocalStore {
    /// Demo schedule for running without a database: Tuesday through
    /// Saturday, and the three consultation offers of the boutique.
    pub fn insert_example_schedule(&self) {
        for day_of_week in 2..=6 {
            self.add_rule(NewAvailabilityRule {
                day_of_week,
                start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                slot_duration: 45,
                break_between: 15,
                enabled: true,
            })
            .expect("example rule is well-formed");
        }

        for (sort_order, (name, description, duration_minutes, price_cents)) in [
            (
                "Consultation style",
                "Conseil personnalisé en boutique",
                45,
                None,
            ),
            (
                "Essayage sur-mesure",
                "Prise de mesures et essayage atelier",
                45,
                Some(4_500),
            ),
            (
                "Dégustation privée",
                "Sélection de vins accompagnée par notre caviste",
                45,
                Some(9_000),
            ),
        ]
        .into_iter()
        .enumerate()
        {
            self.add_service(NewConsultationType {
                name: name.into(),
                description: description.into(),
                duration_minutes,
                price_cents,
                enabled: true,
                sort_order: sort_order as i32,
            })
            .expect("example service is well-formed");
        }
    }
}

impl BookingBackend for LocalStore {
    fn services(&self) -> Result<Vec<ConsultationType>, BookingError> {
        let inner = self.inner.lock().unwrap();
        let mut services: Vec<ConsultationType> = inner
            .services
            .iter()
            .filter(|service| service.enabled)
            .cloned()
            .collect();
        services.sort_by_key(|service| service.sort_order);
        Ok(services)
    }

    fn rule_for_weekday(&self, day_of_week: i16) -> Result<Option<AvailabilityRule>, BookingError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.enabled_rule_for(day_of_week).cloned())
    }

    fn booked_times(&self, date: NaiveDate) -> Result<Vec<NaiveTime>, BookingError> {
        let inner = self.inner.lock().unwrap();
        let mut times: Vec<NaiveTime> = inner
            .appointments
            .values()
            .filter(|appointment| appointment.date == date && appointment.status.occupies_slot())
            .map(|appointment| appointment.time)
            .collect();
        times.sort();
        Ok(times)
    }

    fn book_appointment(&self, request: NewAppointment) -> Result<Appointment, BookingError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner
            .services
            .iter()
            .any(|service| service.id == request.service_id && service.enabled)
        {
            return Err(BookingError::UnknownService(request.service_id));
        }

        let offered = inner
            .enabled_rule_for(slots::day_of_week(request.date))
            .map(|rule| slots::candidate_times(rule))
            .unwrap_or_default();
        if !offered.contains(&request.time) {
            return Err(BookingError::SlotNotOffered {
                date: request.date,
                time: request.time,
            });
        }

        if inner.slot_is_taken(request.date, request.time, None) {
            return Err(BookingError::SlotTaken {
                date: request.date,
                time: request.time,
            });
        }

        let appointment = Appointment {
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
        };
        inner.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn appointments(&self, date: Option<NaiveDate>) -> Result<Vec<Appointment>, BookingError> {
        let inner = self.inner.lock().unwrap();
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|appointment| date.map_or(true, |wanted| appointment.date == wanted))
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| (appointment.date, appointment.time));
        Ok(appointments)
    }

    fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        let mut inner = self.inner.lock().unwrap();

        let (date, time, previous) = match inner.appointments.get(&id) {
            Some(appointment) => (appointment.date, appointment.time, appointment.status),
            None => return Err(BookingError::AppointmentNotFound(id)),
        };

        // Leaving CANCELLED re-occupies the slot, which someone else may
        // have booked since.
        if !previous.occupies_slot()
            && status.occupies_slot()
            && inner.slot_is_taken(date, time, Some(id))
        {
            return Err(BookingError::SlotTaken { date, time });
        }

        let appointment = inner
            .appointments
            .get_mut(&id)
            .expect("presence checked above under the same lock");
        appointment.status = status;
        Ok(appointment.clone())
    }

    fn rules(&self) -> Result<Vec<AvailabilityRule>, BookingError> {
        let inner = self.inner.lock().unwrap();
        let mut rules = inner.rules.clone();
        rules.sort_by_key(|rule| (rule.day_of_week, rule.id));
        Ok(rules)
    }

    fn add_rule(&self, rule: NewAvailabilityRule) -> Result<AvailabilityRule, BookingError> {
        validate_rule(&rule)?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_rule_id += 1;
        let rule = AvailabilityRule {
            id: inner.next_rule_id,
            day_of_week: rule.day_of_week,
            start_time: rule.start_time,
            end_time: rule.end_time,
            slot_duration: rule.slot_duration,
            break_between: rule.break_between,
            enabled: rule.enabled,
        };
        inner.rules.push(rule.clone());
        Ok(rule)
    }

    fn remove_rule(&self, id: i32) -> Result<(), BookingError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rules.len();
        inner.rules.retain(|rule| rule.id != id);
        if inner.rules.len() == before {
            return Err(BookingError::RuleNotFound(id));
        }
        Ok(())
    }

    fn add_service(&self, service: NewConsultationType) -> Result<ConsultationType, BookingError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_service_id += 1;
        let service = ConsultationType {
            id: inner.next_service_id,
            name: service.name,
            description: service.description,
            duration_minutes: service.duration_minutes,
            price_cents: service.price_cents,
            enabled: service.enabled,
            sort_order: service.sort_order,
        };
        inner.services.push(service.clone());
        Ok(service)
    }

    fn remove_service(&self, id: i32) -> Result<(), BookingError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.services.len();
        inner.services.retain(|service| service.id != id);
        if inner.services.len() == before {
            return Err(BookingError::ServiceNotFound(id));
        }
        Ok(())
    }
}
