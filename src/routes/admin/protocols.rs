use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;

use crate::db::store::RecordStore;
use crate::services::error::BookingError;
use crate::services::reservation_service::{HandoverInput, ReservationService, ReturnInput};

/*
    POST /api/admin/reservations/{id}/handover
*/
pub async fn create_handover(
    path: web::Path<String>,
    service: web::Data<ReservationService>,
    input: web::Json<HandoverInput>,
) -> impl Responder {
    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    match service.create_handover(&id, input.into_inner()).await {
        Ok(protocol) => HttpResponse::Ok().json(protocol),
        Err(err) => err.to_response(),
    }
}

/*
    POST /api/admin/reservations/{id}/return
*/
pub async fn create_return(
    path: web::Path<String>,
    store: web::Data<RecordStore>,
    service: web::Data<ReservationService>,
    input: web::Json<ReturnInput>,
) -> impl Responder {
    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    let km_limit = match lookup_km_limit(&store, &id).await {
        Ok(limit) => limit,
        Err(err) => return err.to_response(),
    };

    match service.create_return(&id, input.into_inner(), km_limit).await {
        Ok(protocol) => HttpResponse::Ok().json(protocol),
        Err(err) => err.to_response(),
    }
}

async fn lookup_km_limit(
    store: &RecordStore,
    reservation_id: &ObjectId,
) -> Result<i64, BookingError> {
    let reservation = store
        .get_reservation(reservation_id)
        .await?
        .ok_or_else(|| BookingError::Validation("Reservation not found".to_string()))?;
    let vehicle = store
        .get_vehicle(&reservation.vehicle_id)
        .await?
        .ok_or_else(|| BookingError::Validation("Vehicle not found".to_string()))?;
    Ok(vehicle.km_limit_per_day)
}
