use bson::doc;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Collection};
use std::sync::Arc;

use crate::db::interface::StoreOperations;
use crate::db::mongo::DB_NAME;
use crate::db::records::{
    ContractRecord, CustomerRecord, HandoverRecord, ReservationRecord, ReturnRecord,
    VehicleRecord,
};
use crate::models::contract::SavedContract;
use crate::models::customer::Customer;
use crate::models::protocol::{HandoverProtocol, ReturnProtocol};
use crate::models::reservation::{Reservation, ReservationStatus};
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::AvailabilityService;
use crate::services::error::BookingError;

/// The persistence collaborator. Everything crossing this boundary is a
/// flat snake_cased record (db::records) mapped explicitly to and from the
/// core model, mirroring the shape of the hosted store's tables.
#[derive(Clone)]
pub struct RecordStore {
    client: Arc<Client>,
}

impl RecordStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn vehicles(&self) -> Collection<VehicleRecord> {
        self.client.database(DB_NAME).collection("vehicles")
    }

    fn reservations(&self) -> Collection<ReservationRecord> {
        self.client.database(DB_NAME).collection("reservations")
    }

    fn customers(&self) -> Collection<CustomerRecord> {
        self.client.database(DB_NAME).collection("customers")
    }

    fn handover_protocols(&self) -> Collection<HandoverRecord> {
        self.client.database(DB_NAME).collection("handover_protocols")
    }

    fn return_protocols(&self) -> Collection<ReturnRecord> {
        self.client.database(DB_NAME).collection("return_protocols")
    }

    fn contracts(&self) -> Collection<ContractRecord> {
        self.client.database(DB_NAME).collection("contracts")
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, BookingError> {
        let cursor = self.vehicles().find(doc! {}).await?;
        let records: Vec<VehicleRecord> = cursor.try_collect().await?;
        records.into_iter().map(Vehicle::try_from).collect()
    }

    pub async fn get_vehicle(&self, id: &ObjectId) -> Result<Option<Vehicle>, BookingError> {
        match self.vehicles().find_one(doc! { "_id": id }).await? {
            Some(record) => Ok(Some(Vehicle::try_from(record)?)),
            None => Ok(None),
        }
    }

    pub async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), BookingError> {
        let id = vehicle
            .id
            .ok_or_else(|| BookingError::Validation("Vehicle has no identity".to_string()))?;
        let record = VehicleRecord::from(vehicle);
        self.vehicles()
            .replace_one(doc! { "_id": id }, &record)
            .await?;
        Ok(())
    }

    /// Newest first, matching the admin dashboard's listing order.
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, BookingError> {
        let cursor = self
            .reservations()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        let records: Vec<ReservationRecord> = cursor.try_collect().await?;
        records.into_iter().map(Reservation::try_from).collect()
    }

    pub async fn list_reservations_for_vehicle(
        &self,
        vehicle_id: &ObjectId,
    ) -> Result<Vec<Reservation>, BookingError> {
        let cursor = self
            .reservations()
            .find(doc! { "vehicle_id": vehicle_id })
            .await?;
        let records: Vec<ReservationRecord> = cursor.try_collect().await?;
        records.into_iter().map(Reservation::try_from).collect()
    }

    pub async fn get_reservation(
        &self,
        id: &ObjectId,
    ) -> Result<Option<Reservation>, BookingError> {
        match self.reservations().find_one(doc! { "_id": id }).await? {
            Some(record) => Ok(Some(Reservation::try_from(record)?)),
            None => Ok(None),
        }
    }

    /// Conditional insert: re-checks the overlap against a LIVE read of the
    /// vehicle's reservations immediately before writing, so the race
    /// window shrinks from "page load to submit" to a single query-insert
    /// pair. An idempotency-key hit short-circuits to the original id.
    ///
    /// TODO: switch to a server-side transaction once the hosted tier
    /// supports them.
    pub async fn create_reservation(
        &self,
        reservation: &Reservation,
    ) -> Result<ObjectId, BookingError> {
        if let Some(key) = &reservation.idempotency_key {
            if let Some(existing) = self
                .reservations()
                .find_one(doc! { "idempotency_key": key })
                .await?
            {
                if let Some(id) = existing.id {
                    log::info!("Duplicate submit for idempotency key, returning existing reservation");
                    return Ok(id);
                }
            }
        }

        let live = self
            .list_reservations_for_vehicle(&reservation.vehicle_id)
            .await?;
        if !AvailabilityService::is_available(
            &live,
            &reservation.vehicle_id,
            reservation.start_date,
            reservation.end_date,
        ) {
            return Err(BookingError::Conflict(
                "The vehicle was booked for that period by another customer".to_string(),
            ));
        }

        let record = ReservationRecord::from(reservation);
        let result = self.reservations().insert_one(&record).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BookingError::CollaboratorUnavailable(
                "Store returned no id for the new reservation".to_string(),
            ))
    }

    pub async fn update_reservation_status(
        &self,
        id: &ObjectId,
        status: ReservationStatus,
    ) -> Result<(), BookingError> {
        self.reservations()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?;
        Ok(())
    }

    pub async fn delete_reservation(&self, id: &ObjectId) -> Result<(), BookingError> {
        self.reservations().delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, BookingError> {
        let cursor = self.customers().find(doc! {}).await?;
        let records: Vec<CustomerRecord> = cursor.try_collect().await?;
        Ok(records.into_iter().map(Customer::from).collect())
    }

    pub async fn get_customer(&self, id: &ObjectId) -> Result<Option<Customer>, BookingError> {
        Ok(self
            .customers()
            .find_one(doc! { "_id": id })
            .await?
            .map(Customer::from))
    }

    pub async fn create_customer(&self, customer: &Customer) -> Result<ObjectId, BookingError> {
        let record = CustomerRecord::from(customer);
        let result = self.customers().insert_one(&record).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BookingError::CollaboratorUnavailable(
                "Store returned no id for the new customer".to_string(),
            ))
    }

    pub async fn get_handover_protocol(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<HandoverProtocol>, BookingError> {
        Ok(self
            .handover_protocols()
            .find_one(doc! { "reservation_id": reservation_id })
            .await?
            .map(HandoverProtocol::from))
    }

    pub async fn create_handover_protocol(
        &self,
        protocol: &HandoverProtocol,
    ) -> Result<ObjectId, BookingError> {
        let record = HandoverRecord::from(protocol);
        let result = self.handover_protocols().insert_one(&record).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BookingError::CollaboratorUnavailable(
                "Store returned no id for the handover protocol".to_string(),
            ))
    }

    pub async fn get_return_protocol(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<ReturnProtocol>, BookingError> {
        Ok(self
            .return_protocols()
            .find_one(doc! { "reservation_id": reservation_id })
            .await?
            .map(ReturnProtocol::from))
    }

    pub async fn create_return_protocol(
        &self,
        protocol: &ReturnProtocol,
    ) -> Result<ObjectId, BookingError> {
        let record = ReturnRecord::from(protocol);
        let result = self.return_protocols().insert_one(&record).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BookingError::CollaboratorUnavailable(
                "Store returned no id for the return protocol".to_string(),
            ))
    }

    pub async fn list_contracts(&self) -> Result<Vec<SavedContract>, BookingError> {
        let cursor = self
            .contracts()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        let records: Vec<ContractRecord> = cursor.try_collect().await?;
        Ok(records.into_iter().map(SavedContract::from).collect())
    }

    pub async fn create_contract(
        &self,
        contract: &SavedContract,
    ) -> Result<ObjectId, BookingError> {
        let record = ContractRecord::from(contract);
        let result = self.contracts().insert_one(&record).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BookingError::CollaboratorUnavailable(
                "Store returned no id for the contract".to_string(),
            ))
    }
}

impl StoreOperations for RecordStore {
    async fn get_reservation(&self, id: &ObjectId) -> Result<Option<Reservation>, BookingError> {
        RecordStore::get_reservation(self, id).await
    }

    async fn create_customer(&self, customer: &Customer) -> Result<ObjectId, BookingError> {
        RecordStore::create_customer(self, customer).await
    }

    async fn create_reservation(
        &self,
        reservation: &Reservation,
    ) -> Result<ObjectId, BookingError> {
        RecordStore::create_reservation(self, reservation).await
    }

    async fn update_reservation_status(
        &self,
        id: &ObjectId,
        status: ReservationStatus,
    ) -> Result<(), BookingError> {
        RecordStore::update_reservation_status(self, id, status).await
    }

    async fn delete_reservation(&self, id: &ObjectId) -> Result<(), BookingError> {
        RecordStore::delete_reservation(self, id).await
    }

    async fn get_handover_protocol(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<HandoverProtocol>, BookingError> {
        RecordStore::get_handover_protocol(self, reservation_id).await
    }

    async fn create_handover_protocol(
        &self,
        protocol: &HandoverProtocol,
    ) -> Result<ObjectId, BookingError> {
        RecordStore::create_handover_protocol(self, protocol).await
    }

    async fn get_return_protocol(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<ReturnProtocol>, BookingError> {
        RecordStore::get_return_protocol(self, reservation_id).await
    }

    async fn create_return_protocol(
        &self,
        protocol: &ReturnProtocol,
    ) -> Result<ObjectId, BookingError> {
        RecordStore::create_return_protocol(self, protocol).await
    }
}
