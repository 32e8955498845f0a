use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::db::store::RecordStore;
use crate::middleware::auth::AdminAuth;
use crate::models::reservation::ReservationStatus;
use crate::services::gemini_service::GeminiService;

pub mod contracts;
pub mod protocols;
pub mod reservations;
pub mod vehicles;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AdminAuth)
            .route("/stats", web::get().to(stats))
            .route("/analysis", web::get().to(analysis))
            .route("/customers", web::get().to(list_customers))
            .route("/reservations", web::get().to(reservations::list))
            .route(
                "/reservations/{id}/status",
                web::put().to(reservations::update_status),
            )
            .route("/reservations/{id}", web::delete().to(reservations::delete))
            .route(
                "/reservations/{id}/handover",
                web::post().to(protocols::create_handover),
            )
            .route(
                "/reservations/{id}/return",
                web::post().to(protocols::create_return),
            )
            .route(
                "/reservations/{id}/contract",
                web::post().to(contracts::generate),
            )
            .route("/contracts", web::get().to(contracts::list))
            .route("/vehicles", web::get().to(vehicles::list))
            .route("/vehicles/{id}", web::put().to(vehicles::update)),
    );
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_revenue: i64,
    pub active_bookings: usize,
    pub pending_bookings: usize,
}

/*
    GET /api/admin/stats
*/
pub async fn stats(store: web::Data<RecordStore>) -> impl Responder {
    match store.list_reservations().await {
        Ok(reservations) => {
            let stats = DashboardStats {
                total_revenue: reservations
                    .iter()
                    .filter(|r| r.status != ReservationStatus::Cancelled)
                    .map(|r| r.total_price)
                    .sum(),
                active_bookings: reservations
                    .iter()
                    .filter(|r| r.status == ReservationStatus::Confirmed)
                    .count(),
                pending_bookings: reservations
                    .iter()
                    .filter(|r| r.status == ReservationStatus::Pending)
                    .count(),
            };
            HttpResponse::Ok().json(stats)
        }
        Err(err) => {
            log::error!("Failed to compute stats: {}", err);
            err.to_response()
        }
    }
}

/*
    GET /api/admin/analysis
*/
pub async fn analysis(
    store: web::Data<RecordStore>,
    gemini: web::Data<GeminiService>,
) -> impl Responder {
    match store.list_reservations().await {
        Ok(reservations) => HttpResponse::Ok().json(gemini.analyze_trends(&reservations).await),
        Err(err) => {
            log::error!("Failed to read reservations for analysis: {}", err);
            err.to_response()
        }
    }
}

/*
    GET /api/admin/customers
*/
pub async fn list_customers(store: web::Data<RecordStore>) -> impl Responder {
    match store.list_customers().await {
        Ok(customers) => HttpResponse::Ok().json(customers),
        Err(err) => {
            log::error!("Failed to list customers: {}", err);
            err.to_response()
        }
    }
}
