use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::db::interface::StoreOperations;
use crate::db::store::RecordStore;
use crate::models::customer::Customer;
use crate::models::protocol::{HandoverProtocol, ReturnProtocol};
use crate::models::reservation::{Reservation, ReservationStatus};
use crate::services::booking_service::ReservationRequest;
use crate::services::error::BookingError;
use crate::services::mileage_service::{MileageService, DEFAULT_RATE_PER_EXTRA_KM};

#[derive(Debug, Deserialize)]
pub struct HandoverInput {
    pub mileage: i64,
    pub fuel_level: i64,
    pub cleanliness: String,
    pub damages: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ReturnInput {
    pub return_mileage: i64,
    pub return_fuel_level: i64,
    pub return_damages: String,
    #[serde(default)]
    pub notes: String,
    pub rate_per_extra_km: Option<i64>,
}

/// Outcome of booking completion. Under the optimistic policy a store
/// outage still yields success to the customer, just without ids.
#[derive(Debug)]
pub enum CreateOutcome {
    Persisted {
        reservation_id: ObjectId,
        customer_id: ObjectId,
    },
    AcceptedUnpersisted,
}

/// Owner-initiated transitions only; Cancelled and Completed are terminal.
pub fn can_transition(from: ReservationStatus, to: ReservationStatus) -> bool {
    matches!(
        (from, to),
        (ReservationStatus::Pending, ReservationStatus::Confirmed)
            | (ReservationStatus::Pending, ReservationStatus::Cancelled)
            | (ReservationStatus::Confirmed, ReservationStatus::Cancelled)
            | (ReservationStatus::Confirmed, ReservationStatus::Completed)
    )
}

/// Tracks reservations through their status transitions and owns the side
/// effects: persisting customer and reservation records, protocol ordering,
/// and the extra-km settlement on return.
#[derive(Clone)]
pub struct ReservationService<S = RecordStore> {
    store: S,
    optimistic_completion: bool,
}

impl<S: StoreOperations> ReservationService<S> {
    pub fn new(store: S, optimistic_completion: bool) -> Self {
        Self {
            store,
            optimistic_completion,
        }
    }

    /// `OPTIMISTIC_COMPLETION=true` reproduces the historical behavior of
    /// confirming the booking to the customer even when the store write
    /// fails. Off by default.
    pub fn from_env(store: S) -> Self {
        let optimistic = std::env::var("OPTIMISTIC_COMPLETION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Self::new(store, optimistic)
    }

    /// Booking completion: persists the customer, then the reservation.
    /// Business conflicts (the range was taken meanwhile) always propagate;
    /// only store outages are subject to the optimistic policy.
    pub async fn create(&self, request: ReservationRequest) -> Result<CreateOutcome, BookingError> {
        let customer = Customer {
            id: None,
            first_name: request.contact.first_name.clone(),
            last_name: request.contact.last_name.clone(),
            email: request.contact.email.clone(),
            phone: request.contact.phone.clone(),
            address: request.contact.address.clone(),
            id_number: request.contact.id_number.clone(),
        };

        let customer_id = match self.store.create_customer(&customer).await {
            Ok(id) => id,
            Err(BookingError::CollaboratorUnavailable(msg)) if self.optimistic_completion => {
                log::error!("Store unavailable during booking completion: {}", msg);
                return Ok(CreateOutcome::AcceptedUnpersisted);
            }
            Err(err) => return Err(err),
        };

        let reservation = Reservation {
            id: None,
            vehicle_id: request.vehicle_id,
            customer_id,
            start_date: request.start_date,
            end_date: request.end_date,
            total_price: request.total_price,
            deposit: request.deposit,
            status: request.status,
            created_at: Utc::now(),
            customer_note: request.contact.note.clone(),
            idempotency_key: request.idempotency_key.clone(),
        };

        match self.store.create_reservation(&reservation).await {
            Ok(reservation_id) => Ok(CreateOutcome::Persisted {
                reservation_id,
                customer_id,
            }),
            Err(BookingError::CollaboratorUnavailable(msg)) if self.optimistic_completion => {
                log::error!("Store unavailable during booking completion: {}", msg);
                Ok(CreateOutcome::AcceptedUnpersisted)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn update_status(
        &self,
        id: &ObjectId,
        new_status: ReservationStatus,
    ) -> Result<Reservation, BookingError> {
        let reservation = self
            .store
            .get_reservation(id)
            .await?
            .ok_or_else(|| BookingError::Validation("Reservation not found".to_string()))?;

        if !can_transition(reservation.status, new_status) {
            return Err(BookingError::Validation(format!(
                "Cannot move a {} reservation to {}",
                reservation.status.as_str(),
                new_status.as_str()
            )));
        }

        self.store.update_reservation_status(id, new_status).await?;
        Ok(Reservation {
            status: new_status,
            ..reservation
        })
    }

    /// Permanent removal. The route requires an explicit confirmation flag
    /// before calling this.
    pub async fn delete(&self, id: &ObjectId) -> Result<(), BookingError> {
        if self.store.get_reservation(id).await?.is_none() {
            return Err(BookingError::Validation("Reservation not found".to_string()));
        }
        self.store.delete_reservation(id).await
    }

    pub async fn create_handover(
        &self,
        reservation_id: &ObjectId,
        input: HandoverInput,
    ) -> Result<HandoverProtocol, BookingError> {
        if self.store.get_reservation(reservation_id).await?.is_none() {
            return Err(BookingError::Validation("Reservation not found".to_string()));
        }
        if self
            .store
            .get_handover_protocol(reservation_id)
            .await?
            .is_some()
        {
            return Err(BookingError::Conflict(
                "A handover protocol already exists for this reservation".to_string(),
            ));
        }
        if !(0..=100).contains(&input.fuel_level) {
            return Err(BookingError::Validation(
                "Fuel level must be between 0 and 100".to_string(),
            ));
        }

        let mut protocol = HandoverProtocol {
            id: None,
            reservation_id: *reservation_id,
            mileage: input.mileage,
            fuel_level: input.fuel_level,
            cleanliness: input.cleanliness,
            damages: input.damages,
            notes: input.notes,
            created_at: Utc::now(),
        };
        let id = self.store.create_handover_protocol(&protocol).await?;
        protocol.id = Some(id);
        Ok(protocol)
    }

    /// The return protocol may only be created after the handover exists;
    /// anything else is a precondition failure reported to the owner.
    pub async fn create_return(
        &self,
        reservation_id: &ObjectId,
        input: ReturnInput,
        km_limit_per_day: i64,
    ) -> Result<ReturnProtocol, BookingError> {
        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| BookingError::Validation("Reservation not found".to_string()))?;

        let handover = self
            .store
            .get_handover_protocol(reservation_id)
            .await?
            .ok_or_else(|| {
                BookingError::PreconditionFailed(
                    "A handover protocol must be recorded before the return".to_string(),
                )
            })?;

        if self
            .store
            .get_return_protocol(reservation_id)
            .await?
            .is_some()
        {
            return Err(BookingError::Conflict(
                "A return protocol already exists for this reservation".to_string(),
            ));
        }
        if !(0..=100).contains(&input.return_fuel_level) {
            return Err(BookingError::Validation(
                "Fuel level must be between 0 and 100".to_string(),
            ));
        }

        let rate = input.rate_per_extra_km.unwrap_or(DEFAULT_RATE_PER_EXTRA_KM);
        let extra_km_charge = MileageService::extra_km_charge(
            reservation.rental_days(),
            km_limit_per_day,
            handover.mileage,
            input.return_mileage,
            rate,
        )?;

        let mut protocol = ReturnProtocol {
            id: None,
            reservation_id: *reservation_id,
            return_mileage: input.return_mileage,
            return_fuel_level: input.return_fuel_level,
            return_damages: input.return_damages,
            notes: input.notes,
            extra_km_charge,
            created_at: Utc::now(),
        };
        let id = self.store.create_return_protocol(&protocol).await?;
        protocol.id = Some(id);
        Ok(protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::booking_service::ContactDetails;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        reservations: Mutex<Vec<Reservation>>,
        customers: Mutex<Vec<Customer>>,
        handovers: Mutex<Vec<HandoverProtocol>>,
        returns: Mutex<Vec<ReturnProtocol>>,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn unavailable() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        fn with_reservation(reservation: Reservation) -> Self {
            let store = Self::default();
            store.reservations.lock().unwrap().push(reservation);
            store
        }
    }

    impl StoreOperations for MemoryStore {
        async fn get_reservation(
            &self,
            id: &ObjectId,
        ) -> Result<Option<Reservation>, BookingError> {
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id.as_ref() == Some(id))
                .cloned())
        }

        async fn create_customer(&self, customer: &Customer) -> Result<ObjectId, BookingError> {
            if self.fail_writes {
                return Err(BookingError::CollaboratorUnavailable(
                    "connection refused".to_string(),
                ));
            }
            let id = ObjectId::new();
            let mut stored = customer.clone();
            stored.id = Some(id);
            self.customers.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn create_reservation(
            &self,
            reservation: &Reservation,
        ) -> Result<ObjectId, BookingError> {
            if self.fail_writes {
                return Err(BookingError::CollaboratorUnavailable(
                    "connection refused".to_string(),
                ));
            }
            let id = ObjectId::new();
            let mut stored = reservation.clone();
            stored.id = Some(id);
            self.reservations.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn update_reservation_status(
            &self,
            id: &ObjectId,
            status: ReservationStatus,
        ) -> Result<(), BookingError> {
            let mut reservations = self.reservations.lock().unwrap();
            if let Some(r) = reservations.iter_mut().find(|r| r.id.as_ref() == Some(id)) {
                r.status = status;
            }
            Ok(())
        }

        async fn delete_reservation(&self, id: &ObjectId) -> Result<(), BookingError> {
            self.reservations
                .lock()
                .unwrap()
                .retain(|r| r.id.as_ref() != Some(id));
            Ok(())
        }

        async fn get_handover_protocol(
            &self,
            reservation_id: &ObjectId,
        ) -> Result<Option<HandoverProtocol>, BookingError> {
            Ok(self
                .handovers
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.reservation_id == *reservation_id)
                .cloned())
        }

        async fn create_handover_protocol(
            &self,
            protocol: &HandoverProtocol,
        ) -> Result<ObjectId, BookingError> {
            let id = ObjectId::new();
            let mut stored = protocol.clone();
            stored.id = Some(id);
            self.handovers.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn get_return_protocol(
            &self,
            reservation_id: &ObjectId,
        ) -> Result<Option<ReturnProtocol>, BookingError> {
            Ok(self
                .returns
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.reservation_id == *reservation_id)
                .cloned())
        }

        async fn create_return_protocol(
            &self,
            protocol: &ReturnProtocol,
        ) -> Result<ObjectId, BookingError> {
            let id = ObjectId::new();
            let mut stored = protocol.clone();
            stored.id = Some(id);
            self.returns.lock().unwrap().push(stored);
            Ok(id)
        }
    }

    fn request() -> ReservationRequest {
        ReservationRequest {
            vehicle_id: ObjectId::new(),
            contact: ContactDetails {
                first_name: "Jana".to_string(),
                last_name: "Novakova".to_string(),
                email: "jana@example.com".to_string(),
                phone: "+420 777 123 456".to_string(),
                address: "Brno".to_string(),
                id_number: None,
                note: None,
            },
            start_date: "2026-07-01".parse().unwrap(),
            end_date: "2026-07-11".parse().unwrap(),
            total_price: 46000,
            deposit: 25000,
            status: ReservationStatus::Pending,
            idempotency_key: None,
        }
    }

    fn confirmed_reservation(id: ObjectId) -> Reservation {
        Reservation {
            id: Some(id),
            vehicle_id: ObjectId::new(),
            customer_id: ObjectId::new(),
            start_date: "2026-07-01".parse().unwrap(),
            end_date: "2026-07-11".parse().unwrap(),
            total_price: 46000,
            deposit: 25000,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
            customer_note: None,
            idempotency_key: None,
        }
    }

    fn handover_input(mileage: i64) -> HandoverInput {
        HandoverInput {
            mileage,
            fuel_level: 100,
            cleanliness: "Clean".to_string(),
            damages: "None".to_string(),
            notes: String::new(),
        }
    }

    fn return_input(return_mileage: i64) -> ReturnInput {
        ReturnInput {
            return_mileage,
            return_fuel_level: 90,
            return_damages: "None".to_string(),
            notes: String::new(),
            rate_per_extra_km: None,
        }
    }

    #[test]
    fn transition_table_matches_the_lifecycle() {
        use ReservationStatus::*;

        assert!(can_transition(Pending, Confirmed));
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Confirmed, Cancelled));
        assert!(can_transition(Confirmed, Completed));

        // Terminal states.
        assert!(!can_transition(Cancelled, Pending));
        assert!(!can_transition(Cancelled, Confirmed));
        assert!(!can_transition(Completed, Confirmed));
        assert!(!can_transition(Completed, Cancelled));

        // No skipping straight to completed.
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Pending, Pending));
    }

    #[actix_rt::test]
    async fn create_persists_customer_and_reservation() {
        let service = ReservationService::new(MemoryStore::default(), false);

        let outcome = service.create(request()).await.unwrap();
        match outcome {
            CreateOutcome::Persisted { reservation_id, .. } => {
                let stored = service
                    .store
                    .get_reservation(&reservation_id)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(stored.total_price, 46000);
                assert_eq!(stored.status, ReservationStatus::Pending);
            }
            CreateOutcome::AcceptedUnpersisted => panic!("expected a persisted reservation"),
        }
        assert_eq!(service.store.customers.lock().unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn store_outage_with_optimistic_policy_still_accepts() {
        let service = ReservationService::new(MemoryStore::unavailable(), true);

        let outcome = service.create(request()).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::AcceptedUnpersisted));
    }

    #[actix_rt::test]
    async fn store_outage_without_optimistic_policy_propagates() {
        let service = ReservationService::new(MemoryStore::unavailable(), false);

        let err = service.create(request()).await.unwrap_err();
        assert!(matches!(err, BookingError::CollaboratorUnavailable(_)));
    }

    #[actix_rt::test]
    async fn business_conflict_propagates_even_when_optimistic() {
        struct ConflictingStore(MemoryStore);

        impl StoreOperations for ConflictingStore {
            async fn get_reservation(
                &self,
                id: &ObjectId,
            ) -> Result<Option<Reservation>, BookingError> {
                self.0.get_reservation(id).await
            }
            async fn create_customer(
                &self,
                customer: &Customer,
            ) -> Result<ObjectId, BookingError> {
                self.0.create_customer(customer).await
            }
            async fn create_reservation(
                &self,
                _reservation: &Reservation,
            ) -> Result<ObjectId, BookingError> {
                Err(BookingError::Conflict(
                    "The vehicle was booked for that period by another customer".to_string(),
                ))
            }
            async fn update_reservation_status(
                &self,
                id: &ObjectId,
                status: ReservationStatus,
            ) -> Result<(), BookingError> {
                self.0.update_reservation_status(id, status).await
            }
            async fn delete_reservation(&self, id: &ObjectId) -> Result<(), BookingError> {
                self.0.delete_reservation(id).await
            }
            async fn get_handover_protocol(
                &self,
                reservation_id: &ObjectId,
            ) -> Result<Option<HandoverProtocol>, BookingError> {
                self.0.get_handover_protocol(reservation_id).await
            }
            async fn create_handover_protocol(
                &self,
                protocol: &HandoverProtocol,
            ) -> Result<ObjectId, BookingError> {
                self.0.create_handover_protocol(protocol).await
            }
            async fn get_return_protocol(
                &self,
                reservation_id: &ObjectId,
            ) -> Result<Option<ReturnProtocol>, BookingError> {
                self.0.get_return_protocol(reservation_id).await
            }
            async fn create_return_protocol(
                &self,
                protocol: &ReturnProtocol,
            ) -> Result<ObjectId, BookingError> {
                self.0.create_return_protocol(protocol).await
            }
        }

        let service = ReservationService::new(ConflictingStore(MemoryStore::default()), true);

        let err = service.create(request()).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
    }

    #[actix_rt::test]
    async fn return_before_handover_is_a_precondition_failure() {
        let id = ObjectId::new();
        let store = MemoryStore::with_reservation(confirmed_reservation(id));
        let service = ReservationService::new(store, false);

        let err = service
            .create_return(&id, return_input(54_000), 300)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::PreconditionFailed(_)));
        assert!(service.store.returns.lock().unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn return_after_handover_settles_extra_km() {
        let id = ObjectId::new();
        let store = MemoryStore::with_reservation(confirmed_reservation(id));
        let service = ReservationService::new(store, false);

        service
            .create_handover(&id, handover_input(50_000))
            .await
            .unwrap();

        // 10 days at 300 km/day leaves a 3000 km allowance; 3500 driven.
        let protocol = service
            .create_return(&id, return_input(53_500), 300)
            .await
            .unwrap();
        assert_eq!(protocol.extra_km_charge, 500 * DEFAULT_RATE_PER_EXTRA_KM);
    }

    #[actix_rt::test]
    async fn second_handover_is_a_conflict() {
        let id = ObjectId::new();
        let store = MemoryStore::with_reservation(confirmed_reservation(id));
        let service = ReservationService::new(store, false);

        service
            .create_handover(&id, handover_input(50_000))
            .await
            .unwrap();
        let err = service
            .create_handover(&id, handover_input(50_000))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
    }

    #[actix_rt::test]
    async fn invalid_transition_is_rejected() {
        let id = ObjectId::new();
        let mut reservation = confirmed_reservation(id);
        reservation.status = ReservationStatus::Completed;
        let store = MemoryStore::with_reservation(reservation);
        let service = ReservationService::new(store, false);

        let err = service
            .update_status(&id, ReservationStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[actix_rt::test]
    async fn valid_transition_is_applied() {
        let id = ObjectId::new();
        let mut reservation = confirmed_reservation(id);
        reservation.status = ReservationStatus::Pending;
        let store = MemoryStore::with_reservation(reservation);
        let service = ReservationService::new(store, false);

        let updated = service
            .update_status(&id, ReservationStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Confirmed);
        let stored = service.store.get_reservation(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Confirmed);
    }
}
