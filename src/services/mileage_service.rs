use crate::services::error::BookingError;

/// CZK billed per kilometre over the allowance.
pub const DEFAULT_RATE_PER_EXTRA_KM: i64 = 10;

pub struct MileageService;

impl MileageService {
    /// Surcharge for distance driven beyond `rental_days * km_limit_per_day`.
    /// A return odometer below the handover reading is a data-entry error
    /// and is reported, never clamped away.
    pub fn extra_km_charge(
        rental_days: i64,
        km_limit_per_day: i64,
        handover_mileage: i64,
        return_mileage: i64,
        rate_per_extra_km: i64,
    ) -> Result<i64, BookingError> {
        if return_mileage < handover_mileage {
            return Err(BookingError::Validation(format!(
                "Return mileage {} is below handover mileage {}",
                return_mileage, handover_mileage
            )));
        }

        let allowed = rental_days * km_limit_per_day;
        let driven = return_mileage - handover_mileage;
        let overage = (driven - allowed).max(0);
        Ok(overage * rate_per_extra_km)
    }
}
