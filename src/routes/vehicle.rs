use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;

use crate::db::store::RecordStore;

/*
    /api/vehicles (active only)
*/
pub async fn get_vehicles(store: web::Data<RecordStore>) -> impl Responder {
    match store.list_vehicles().await {
        Ok(vehicles) => {
            let active: Vec<_> = vehicles.into_iter().filter(|v| v.is_active).collect();
            HttpResponse::Ok().json(active)
        }
        Err(err) => {
            log::error!("Failed to list vehicles: {}", err);
            err.to_response()
        }
    }
}

/*
    /api/vehicles/{id}
*/
pub async fn get_by_id(path: web::Path<String>, store: web::Data<RecordStore>) -> impl Responder {
    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    match store.get_vehicle(&id).await {
        Ok(Some(vehicle)) => HttpResponse::Ok().json(vehicle),
        Ok(None) => HttpResponse::NotFound().body("Vehicle not found"),
        Err(err) => {
            log::error!("Failed to retrieve vehicle: {}", err);
            err.to_response()
        }
    }
}
