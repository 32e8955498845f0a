use actix_web::{middleware::Logger, web, App};
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::sync::Arc;
use std::time::Duration;

use camper_rental_api::db::store::RecordStore;
use camper_rental_api::routes;
use camper_rental_api::services::gemini_service::GeminiService;
use camper_rental_api::services::reservation_service::ReservationService;

pub struct TestApp {
    pub store: RecordStore,
    pub reservation_service: ReservationService,
    pub gemini_service: GeminiService,
}

impl TestApp {
    /// Builds the app against a lazily connecting client; tests only hit
    /// endpoints that are rejected before any store round trip, so no
    /// MongoDB instance is needed.
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mut options = ClientOptions::parse(&mongo_uri)
            .await
            .expect("test mongo uri should parse");
        options.connect_timeout = Some(Duration::from_secs(1));
        options.server_selection_timeout = Some(Duration::from_secs(1));
        let client = Arc::new(Client::with_options(options).expect("client options are valid"));

        let store = RecordStore::new(client);
        let reservation_service = ReservationService::new(store.clone(), false);
        let gemini_service = GeminiService::from_env();

        Self {
            store,
            reservation_service,
            gemini_service,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(Logger::default())
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(self.reservation_service.clone()))
            .app_data(web::Data::new(self.gemini_service.clone()))
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
    }
}
