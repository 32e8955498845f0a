use mongodb::bson::oid::ObjectId;

use crate::models::customer::Customer;
use crate::models::protocol::{HandoverProtocol, ReturnProtocol};
use crate::models::reservation::{Reservation, ReservationStatus};
use crate::services::error::BookingError;

/// The slice of the persistence collaborator the reservation lifecycle
/// depends on. RecordStore is the production implementation.
pub trait StoreOperations {
    async fn get_reservation(&self, id: &ObjectId) -> Result<Option<Reservation>, BookingError>;
    async fn create_customer(&self, customer: &Customer) -> Result<ObjectId, BookingError>;
    async fn create_reservation(&self, reservation: &Reservation)
        -> Result<ObjectId, BookingError>;
    async fn update_reservation_status(
        &self,
        id: &ObjectId,
        status: ReservationStatus,
    ) -> Result<(), BookingError>;
    async fn delete_reservation(&self, id: &ObjectId) -> Result<(), BookingError>;

    async fn get_handover_protocol(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<HandoverProtocol>, BookingError>;
    async fn create_handover_protocol(
        &self,
        protocol: &HandoverProtocol,
    ) -> Result<ObjectId, BookingError>;
    async fn get_return_protocol(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<ReturnProtocol>, BookingError>;
    async fn create_return_protocol(
        &self,
        protocol: &ReturnProtocol,
    ) -> Result<ObjectId, BookingError>;
}
