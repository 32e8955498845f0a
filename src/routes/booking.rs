use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::store::RecordStore;
use crate::models::vehicle::Vehicle;
use crate::services::booking_service::{self, BookingFlow, ContactDetails};
use crate::services::error::BookingError;
use crate::services::pricing_service::PricingService;
use crate::services::reservation_service::{CreateOutcome, ReservationService};

#[derive(Debug, Deserialize)]
pub struct QuoteInput {
    pub vehicle_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub days: i64,
    pub total_price: i64,
    pub deposit: i64,
}

#[derive(Debug, Deserialize)]
pub struct BookingInput {
    pub vehicle_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub id_number: Option<String>,
    pub note: Option<String>,
    /// Client-generated token; resubmitting with the same key returns the
    /// original reservation instead of creating a duplicate.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    pub total_price: i64,
}

async fn load_bookable_vehicle(
    store: &RecordStore,
    raw_id: &str,
) -> Result<Vehicle, BookingError> {
    let id = ObjectId::parse_str(raw_id)
        .map_err(|_| BookingError::Validation("Invalid vehicle ID".to_string()))?;
    let vehicle = store
        .get_vehicle(&id)
        .await?
        .ok_or_else(|| BookingError::Validation("Vehicle not found".to_string()))?;
    if !vehicle.is_active {
        return Err(BookingError::Validation(
            "This vehicle is not currently offered".to_string(),
        ));
    }
    Ok(vehicle)
}

/*
    POST /api/bookings/quote
*/
pub async fn quote(store: web::Data<RecordStore>, input: web::Json<QuoteInput>) -> impl Responder {
    let input = input.into_inner();

    let vehicle = match load_bookable_vehicle(&store, &input.vehicle_id).await {
        Ok(vehicle) => vehicle,
        Err(err) => return err.to_response(),
    };
    let vehicle_id = vehicle.id.expect("stored vehicle has an id");

    let existing = match store.list_reservations_for_vehicle(&vehicle_id).await {
        Ok(reservations) => reservations,
        Err(err) => {
            log::error!("Failed to read reservations for quote: {}", err);
            return err.to_response();
        }
    };

    match booking_service::quote(&vehicle, &existing, input.start_date, input.end_date) {
        Ok(total_price) => HttpResponse::Ok().json(QuoteResponse {
            days: PricingService::rental_days(input.start_date, input.end_date),
            total_price,
            deposit: vehicle.deposit,
        }),
        Err(err) => err.to_response(),
    }
}

/*
    POST /api/bookings
*/
pub async fn create_booking(
    store: web::Data<RecordStore>,
    reservations: web::Data<ReservationService>,
    input: web::Json<BookingInput>,
) -> impl Responder {
    let input = input.into_inner();

    let vehicle = match load_bookable_vehicle(&store, &input.vehicle_id).await {
        Ok(vehicle) => vehicle,
        Err(err) => return err.to_response(),
    };
    let vehicle_id = vehicle.id.expect("stored vehicle has an id");

    let existing = match store.list_reservations_for_vehicle(&vehicle_id).await {
        Ok(reservations) => reservations,
        Err(err) => {
            log::error!("Failed to read reservations for booking: {}", err);
            return err.to_response();
        }
    };

    let mut flow = BookingFlow::new(vehicle);
    let total_price = match flow.select_dates(&existing, input.start_date, input.end_date) {
        Ok(price) => price,
        Err(err) => return err.to_response(),
    };
    if let Err(err) = flow.enter_contact(ContactDetails {
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        phone: input.phone,
        address: input.address,
        id_number: input.id_number,
        note: input.note,
    }) {
        return err.to_response();
    }
    let request = match flow.confirm(input.idempotency_key) {
        Ok(request) => request,
        Err(err) => return err.to_response(),
    };

    match reservations.create(request).await {
        Ok(CreateOutcome::Persisted { reservation_id, .. }) => {
            HttpResponse::Ok().json(BookingResponse {
                status: "PENDING".to_string(),
                reservation_id: Some(reservation_id.to_hex()),
                total_price,
            })
        }
        Ok(CreateOutcome::AcceptedUnpersisted) => HttpResponse::Ok().json(BookingResponse {
            status: "PENDING".to_string(),
            reservation_id: None,
            total_price,
        }),
        Err(err) => err.to_response(),
    }
}
