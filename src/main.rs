use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use camper_rental_api::db::{mongo, store::RecordStore};
use camper_rental_api::routes;
use camper_rental_api::services::gemini_service::GeminiService;
use camper_rental_api::services::reservation_service::ReservationService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let store = RecordStore::new(client);
    let reservation_service = ReservationService::from_env(store.clone());
    let gemini_service = GeminiService::from_env();

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        // The public site is embedded on other domains via an iframe, so
        // the API answers cross-origin requests.
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(reservation_service.clone()))
            .app_data(web::Data::new(gemini_service.clone()))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth").route("/login", web::post().to(routes::auth::login)),
                    )
                    .service(
                        web::scope("/vehicles")
                            .route("", web::get().to(routes::vehicle::get_vehicles))
                            .route("/{id}", web::get().to(routes::vehicle::get_by_id)),
                    )
                    .service(
                        web::scope("/bookings")
                            .route("/quote", web::post().to(routes::booking::quote))
                            .route("", web::post().to(routes::booking::create_booking)),
                    )
                    .configure(routes::admin::config),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
