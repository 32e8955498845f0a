use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use crate::models::reservation::{Reservation, ReservationStatus};
use crate::models::vehicle::Vehicle;

pub struct AvailabilityService;

impl AvailabilityService {
    /// True iff `[start, end)` is free of overlap with every non-cancelled
    /// reservation of `vehicle_id`.
    ///
    /// Overlap uses inclusive comparison on both ends: a booking ending on
    /// day X and one starting on day X collide. Same-day turnover is
    /// deliberately disallowed (the vehicle needs cleaning between rentals).
    pub fn is_available(
        reservations: &[Reservation],
        vehicle_id: &ObjectId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> bool {
        !reservations
            .iter()
            .filter(|r| &r.vehicle_id == vehicle_id && r.status != ReservationStatus::Cancelled)
            .any(|r| Self::ranges_overlap(start, end, r.start_date, r.end_date))
    }

    pub fn ranges_overlap(s1: NaiveDate, e1: NaiveDate, s2: NaiveDate, e2: NaiveDate) -> bool {
        s1 <= e2 && e1 >= s2
    }

    /// Duration check co-located with availability in the booking flow.
    pub fn meets_minimum(vehicle: &Vehicle, start: NaiveDate, end: NaiveDate) -> bool {
        (end - start).num_days() >= vehicle.min_days
    }
}
