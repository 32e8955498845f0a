use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::reservation::{Reservation, ReservationStatus};
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::AvailabilityService;
use crate::services::error::BookingError;
use crate::services::pricing_service::PricingService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    SelectingDates,
    EnteringContactInfo,
    ReviewingAndConfirming,
    Submitted,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// What the workflow hands to the lifecycle manager on final confirmation.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub vehicle_id: ObjectId,
    pub contact: ContactDetails,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub deposit: i64,
    pub status: ReservationStatus,
    pub idempotency_key: Option<String>,
}

/// The customer-facing booking flow: date selection, contact details,
/// review, submit. Linear with "back" navigation; going back to date
/// selection drops the quote so availability is re-checked against a fresh
/// reservation snapshot (other sessions may have booked in the meantime).
#[derive(Debug)]
pub struct BookingFlow {
    vehicle: Vehicle,
    step: BookingStep,
    dates: Option<(NaiveDate, NaiveDate)>,
    quoted_price: i64,
    contact: Option<ContactDetails>,
}

impl BookingFlow {
    pub fn new(vehicle: Vehicle) -> Self {
        Self {
            vehicle,
            step: BookingStep::SelectingDates,
            dates: None,
            quoted_price: 0,
            contact: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn quoted_price(&self) -> i64 {
        self.quoted_price
    }

    /// Validates the candidate range and, on success, freezes the quote and
    /// advances to contact entry. Returns the quoted total.
    pub fn select_dates(
        &mut self,
        existing: &[Reservation],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, BookingError> {
        if self.step != BookingStep::SelectingDates {
            return Err(BookingError::Validation(
                "Dates can only be selected at the start of the flow".to_string(),
            ));
        }

        let price = quote(&self.vehicle, existing, start, end)?;

        self.dates = Some((start, end));
        self.quoted_price = price;
        self.step = BookingStep::EnteringContactInfo;
        Ok(price)
    }

    /// Presence-only validation of contact fields, matching what the public
    /// form enforces.
    pub fn enter_contact(&mut self, contact: ContactDetails) -> Result<(), BookingError> {
        if self.step != BookingStep::EnteringContactInfo {
            return Err(BookingError::Validation(
                "Contact details are not expected at this step".to_string(),
            ));
        }

        for (field, value) in [
            ("first_name", &contact.first_name),
            ("last_name", &contact.last_name),
            ("email", &contact.email),
            ("phone", &contact.phone),
            ("address", &contact.address),
        ] {
            if value.trim().is_empty() {
                return Err(BookingError::Validation(format!(
                    "Missing required field: {}",
                    field
                )));
            }
        }

        self.contact = Some(contact);
        self.step = BookingStep::ReviewingAndConfirming;
        Ok(())
    }

    /// Terminal transition: packages the reservation request and moves to
    /// Submitted. Irreversible. The optional idempotency key lets the
    /// persistence layer detect a duplicate submit of the same draft.
    pub fn confirm(
        &mut self,
        idempotency_key: Option<String>,
    ) -> Result<ReservationRequest, BookingError> {
        if self.step != BookingStep::ReviewingAndConfirming {
            return Err(BookingError::Validation(
                "Nothing to confirm at this step".to_string(),
            ));
        }

        let vehicle_id = self.vehicle.id.ok_or_else(|| {
            BookingError::Validation("Vehicle has no identity".to_string())
        })?;
        let (start, end) = self.dates.expect("dates set before review step");
        let contact = self.contact.clone().expect("contact set before review step");

        self.step = BookingStep::Submitted;
        Ok(ReservationRequest {
            vehicle_id,
            contact,
            start_date: start,
            end_date: end,
            total_price: self.quoted_price,
            deposit: self.vehicle.deposit,
            status: ReservationStatus::Pending,
            idempotency_key,
        })
    }

    /// One step back. Re-entering date selection clears the quote, so the
    /// range must pass validation again before the flow can proceed.
    pub fn back(&mut self) {
        self.step = match self.step {
            BookingStep::ReviewingAndConfirming => BookingStep::EnteringContactInfo,
            BookingStep::EnteringContactInfo => {
                self.dates = None;
                self.quoted_price = 0;
                BookingStep::SelectingDates
            }
            other => other,
        };
    }
}

/// Stateless gate used both by the flow and the quote endpoint: min-days,
/// availability against the given snapshot, and a non-zero price.
pub fn quote(
    vehicle: &Vehicle,
    existing: &[Reservation],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<i64, BookingError> {
    if end <= start {
        return Err(BookingError::Validation(
            "End date must be after start date".to_string(),
        ));
    }
    if !AvailabilityService::meets_minimum(vehicle, start, end) {
        return Err(BookingError::Validation(format!(
            "Minimum rental is {} days",
            vehicle.min_days
        )));
    }
    let vehicle_id = vehicle
        .id
        .ok_or_else(|| BookingError::Validation("Vehicle has no identity".to_string()))?;
    if !AvailabilityService::is_available(existing, &vehicle_id, start, end) {
        return Err(BookingError::Conflict(
            "The vehicle is already booked in that period".to_string(),
        ));
    }

    let price = PricingService::total_price(vehicle, start, end);
    if price == 0 {
        return Err(BookingError::Validation("Invalid date range".to_string()));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::vehicle::SeasonRule;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn test_vehicle() -> Vehicle {
        Vehicle {
            id: Some(ObjectId::new()),
            name: "Laika Kreos 7010".to_string(),
            description: String::new(),
            license_plate: "7BM 2026".to_string(),
            vin: None,
            base_price: 3200,
            min_days: 3,
            deposit: 25000,
            km_limit_per_day: 300,
            images: vec![],
            is_active: true,
            seasonal_pricing: vec![SeasonRule {
                id: "s2026-1".to_string(),
                name: "Summer 2026".to_string(),
                start_date: date("2026-06-01"),
                end_date: date("2026-08-31"),
                price_per_day: 4600,
            }],
            equipment: vec![],
        }
    }

    fn confirmed(vehicle_id: ObjectId, start: &str, end: &str) -> Reservation {
        Reservation {
            id: Some(ObjectId::new()),
            vehicle_id,
            customer_id: ObjectId::new(),
            start_date: date(start),
            end_date: date(end),
            total_price: 46000,
            deposit: 25000,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
            customer_note: None,
            idempotency_key: None,
        }
    }

    fn contact() -> ContactDetails {
        ContactDetails {
            first_name: "Jan".to_string(),
            last_name: "Novák".to_string(),
            email: "jan.novak@email.cz".to_string(),
            phone: "+420 777 123 456".to_string(),
            address: "Václavské náměstí 1, Praha".to_string(),
            id_number: None,
            note: None,
        }
    }

    #[test]
    fn happy_path_produces_a_pending_request() {
        let vehicle = test_vehicle();
        let vehicle_id = vehicle.id.unwrap();
        let mut flow = BookingFlow::new(vehicle);

        let price = flow
            .select_dates(&[], date("2026-06-10"), date("2026-06-15"))
            .unwrap();
        assert_eq!(price, 23000);
        assert_eq!(flow.step(), BookingStep::EnteringContactInfo);

        flow.enter_contact(contact()).unwrap();
        assert_eq!(flow.step(), BookingStep::ReviewingAndConfirming);

        let request = flow.confirm(Some("key-1".to_string())).unwrap();
        assert_eq!(flow.step(), BookingStep::Submitted);
        assert_eq!(request.vehicle_id, vehicle_id);
        assert_eq!(request.total_price, 23000);
        assert_eq!(request.deposit, 25000);
        assert_eq!(request.status, ReservationStatus::Pending);
        assert_eq!(request.idempotency_key.as_deref(), Some("key-1"));
    }

    #[test]
    fn short_rental_is_rejected_regardless_of_availability() {
        let mut flow = BookingFlow::new(test_vehicle());
        let result = flow.select_dates(&[], date("2026-06-10"), date("2026-06-12"));
        assert!(matches!(result, Err(BookingError::Validation(_))));
        assert_eq!(flow.step(), BookingStep::SelectingDates);
    }

    #[test]
    fn overlapping_range_is_a_conflict() {
        let vehicle = test_vehicle();
        let existing = vec![confirmed(vehicle.id.unwrap(), "2026-07-10", "2026-07-20")];
        let mut flow = BookingFlow::new(vehicle);
        let result = flow.select_dates(&existing, date("2026-07-20"), date("2026-07-25"));
        assert!(matches!(result, Err(BookingError::Conflict(_))));
    }

    #[test]
    fn missing_contact_field_blocks_progress() {
        let mut flow = BookingFlow::new(test_vehicle());
        flow.select_dates(&[], date("2026-06-10"), date("2026-06-15"))
            .unwrap();

        let mut incomplete = contact();
        incomplete.phone = "  ".to_string();
        let result = flow.enter_contact(incomplete);
        assert!(matches!(result, Err(BookingError::Validation(_))));
        assert_eq!(flow.step(), BookingStep::EnteringContactInfo);
    }

    #[test]
    fn back_to_date_selection_forces_revalidation() {
        let vehicle = test_vehicle();
        let vehicle_id = vehicle.id.unwrap();
        let mut flow = BookingFlow::new(vehicle);
        flow.select_dates(&[], date("2026-07-18"), date("2026-07-22"))
            .unwrap();
        flow.back();
        assert_eq!(flow.step(), BookingStep::SelectingDates);
        assert_eq!(flow.quoted_price(), 0);

        // Someone else booked while the user hesitated.
        let existing = vec![confirmed(vehicle_id, "2026-07-10", "2026-07-20")];
        let result = flow.select_dates(&existing, date("2026-07-18"), date("2026-07-22"));
        assert!(matches!(result, Err(BookingError::Conflict(_))));
    }

    #[test]
    fn confirm_is_terminal() {
        let mut flow = BookingFlow::new(test_vehicle());
        flow.select_dates(&[], date("2026-06-10"), date("2026-06-15"))
            .unwrap();
        flow.enter_contact(contact()).unwrap();
        flow.confirm(None).unwrap();

        assert!(flow.confirm(None).is_err());
        flow.back();
        assert_eq!(flow.step(), BookingStep::Submitted);
    }
}
