use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;

use crate::db::store::RecordStore;
use crate::models::vehicle::Vehicle;

/*
    GET /api/admin/vehicles (includes inactive)
*/
pub async fn list(store: web::Data<RecordStore>) -> impl Responder {
    match store.list_vehicles().await {
        Ok(vehicles) => HttpResponse::Ok().json(vehicles),
        Err(err) => {
            log::error!("Failed to list vehicles: {}", err);
            err.to_response()
        }
    }
}

/*
    PUT /api/admin/vehicles/{id}
*/
pub async fn update(
    path: web::Path<String>,
    store: web::Data<RecordStore>,
    input: web::Json<Vehicle>,
) -> impl Responder {
    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    let mut vehicle = input.into_inner();
    vehicle.id = Some(id);

    // New season rules arrive without an id.
    for rule in &mut vehicle.seasonal_pricing {
        if rule.id.is_empty() {
            rule.id = uuid::Uuid::new_v4().to_string();
        }
    }

    if let Some((a, b)) = vehicle.overlapping_season_rules() {
        return HttpResponse::BadRequest().body(format!(
            "Season rules '{}' and '{}' overlap; adjust their date ranges",
            a.name, b.name
        ));
    }
    for rule in &vehicle.seasonal_pricing {
        if rule.end_date < rule.start_date {
            return HttpResponse::BadRequest().body(format!(
                "Season rule '{}' ends before it starts",
                rule.name
            ));
        }
    }

    match store.update_vehicle(&vehicle).await {
        Ok(()) => HttpResponse::Ok().json(vehicle),
        Err(err) => {
            log::error!("Failed to update vehicle: {}", err);
            err.to_response()
        }
    }
}
