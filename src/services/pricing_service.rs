use chrono::{Duration, NaiveDate};

use crate::models::vehicle::Vehicle;

pub struct PricingService;

impl PricingService {
    /// Total price for renting `vehicle` over `[start, end)`. The end date
    /// is the checkout day and is not billed. Returns 0 when the range is
    /// empty or inverted; callers must treat 0 as "invalid", not "free".
    pub fn total_price(vehicle: &Vehicle, start: NaiveDate, end: NaiveDate) -> i64 {
        if end <= start {
            return 0;
        }

        let mut total = 0;
        let mut day = start;
        while day < end {
            total += Self::price_for_day(vehicle, day);
            day += Duration::days(1);
        }
        total
    }

    /// Per-day rate: the first season rule (in stored order) whose inclusive
    /// range contains the day, falling back to the base price.
    pub fn price_for_day(vehicle: &Vehicle, day: NaiveDate) -> i64 {
        vehicle
            .seasonal_pricing
            .iter()
            .find(|rule| rule.start_date <= day && day <= rule.end_date)
            .map(|rule| rule.price_per_day)
            .unwrap_or(vehicle.base_price)
    }

    /// Number of billed days in `[start, end)`.
    pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
        (end - start).num_days()
    }
}
