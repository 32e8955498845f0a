use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::store::RecordStore;
use crate::models::reservation::{Reservation, ReservationStatus};
use crate::services::reservation_service::ReservationService;

/// Reservation row for the admin dashboard, joined with the customer name.
#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub id: String,
    pub vehicle_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub deposit: i64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
}

impl ReservationView {
    fn new(reservation: Reservation, customer_name: String) -> Self {
        ReservationView {
            id: reservation.id.map(|id| id.to_hex()).unwrap_or_default(),
            vehicle_id: reservation.vehicle_id.to_hex(),
            customer_id: reservation.customer_id.to_hex(),
            customer_name,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            total_price: reservation.total_price,
            deposit: reservation.deposit,
            status: reservation.status,
            created_at: reservation.created_at,
            customer_note: reservation.customer_note,
        }
    }
}

/*
    GET /api/admin/reservations
*/
pub async fn list(store: web::Data<RecordStore>) -> impl Responder {
    let reservations = match store.list_reservations().await {
        Ok(reservations) => reservations,
        Err(err) => {
            log::error!("Failed to list reservations: {}", err);
            return err.to_response();
        }
    };
    let customers = match store.list_customers().await {
        Ok(customers) => customers,
        Err(err) => {
            log::error!("Failed to list customers: {}", err);
            return err.to_response();
        }
    };

    let views: Vec<ReservationView> = reservations
        .into_iter()
        .map(|r| {
            let name = customers
                .iter()
                .find(|c| c.id == Some(r.customer_id))
                .map(|c| c.display_name())
                .unwrap_or_else(|| "Unknown customer".to_string());
            ReservationView::new(r, name)
        })
        .collect();
    HttpResponse::Ok().json(views)
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

/*
    PUT /api/admin/reservations/{id}/status
*/
pub async fn update_status(
    path: web::Path<String>,
    service: web::Data<ReservationService>,
    input: web::Json<StatusInput>,
) -> impl Responder {
    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };
    let status = match ReservationStatus::parse(&input.status) {
        Some(status) => status,
        None => return HttpResponse::BadRequest().body("Unknown status"),
    };

    match service.update_status(&id, status).await {
        Ok(reservation) => HttpResponse::Ok().json(reservation),
        Err(err) => err.to_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/*
    DELETE /api/admin/reservations/{id}?confirm=true
*/
pub async fn delete(
    path: web::Path<String>,
    query: web::Query<DeleteQuery>,
    service: web::Data<ReservationService>,
) -> impl Responder {
    if !query.confirm {
        return HttpResponse::BadRequest()
            .body("Deletion is permanent; pass confirm=true to proceed");
    }
    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    match service.delete(&id).await {
        Ok(()) => HttpResponse::Ok().body("Reservation deleted"),
        Err(err) => err.to_response(),
    }
}
