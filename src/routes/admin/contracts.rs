use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::db::store::RecordStore;
use crate::models::contract::SavedContract;
use crate::services::error::BookingError;
use crate::services::gemini_service::{ContractDetails, GeminiService};

/// "46 000 Kč", thousands separated by spaces.
pub fn format_czk(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{} Kč", grouped)
    } else {
        format!("{} Kč", grouped)
    }
}

/*
    POST /api/admin/reservations/{id}/contract
*/
pub async fn generate(
    path: web::Path<String>,
    store: web::Data<RecordStore>,
    gemini: web::Data<GeminiService>,
) -> impl Responder {
    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    let details = match collect_details(&store, &id).await {
        Ok(details) => details,
        Err(err) => return err.to_response(),
    };

    let content = gemini.generate_contract(&details).await;
    let contract = SavedContract {
        id: None,
        reservation_id: id,
        customer_name: details.customer_name.clone(),
        created_at: Utc::now(),
        content,
    };

    match store.create_contract(&contract).await {
        Ok(contract_id) => HttpResponse::Ok().json(SavedContract {
            id: Some(contract_id),
            ..contract
        }),
        Err(err) => {
            log::error!("Failed to save contract: {}", err);
            err.to_response()
        }
    }
}

/*
    GET /api/admin/contracts
*/
pub async fn list(store: web::Data<RecordStore>) -> impl Responder {
    match store.list_contracts().await {
        Ok(contracts) => HttpResponse::Ok().json(contracts),
        Err(err) => {
            log::error!("Failed to list contracts: {}", err);
            err.to_response()
        }
    }
}

async fn collect_details(
    store: &RecordStore,
    reservation_id: &ObjectId,
) -> Result<ContractDetails, BookingError> {
    let reservation = store
        .get_reservation(reservation_id)
        .await?
        .ok_or_else(|| BookingError::Validation("Reservation not found".to_string()))?;
    let vehicle = store
        .get_vehicle(&reservation.vehicle_id)
        .await?
        .ok_or_else(|| BookingError::Validation("Vehicle not found".to_string()))?;
    let customer = store
        .get_customer(&reservation.customer_id)
        .await?
        .ok_or_else(|| BookingError::Validation("Customer not found".to_string()))?;

    Ok(ContractDetails {
        vehicle_name: vehicle.name,
        license_plate: vehicle.license_plate,
        customer_name: customer.display_name(),
        customer_address: customer.address,
        customer_email: customer.email,
        start_date: reservation.start_date.to_string(),
        end_date: reservation.end_date.to_string(),
        price: format_czk(reservation.total_price),
        deposit: format_czk(reservation.deposit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_formatting_groups_thousands() {
        assert_eq!(format_czk(0), "0 Kč");
        assert_eq!(format_czk(999), "999 Kč");
        assert_eq!(format_czk(46000), "46 000 Kč");
        assert_eq!(format_czk(1234567), "1 234 567 Kč");
    }
}
