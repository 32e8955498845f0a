use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AdminClaims;

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/*
    /api/auth/login
*/
pub async fn login(input: web::Json<LoginInput>) -> impl Responder {
    let hash = match std::env::var("ADMIN_PASSWORD_HASH") {
        Ok(hash) => hash,
        Err(_) => {
            log::error!("ADMIN_PASSWORD_HASH is not set; admin login disabled");
            return HttpResponse::ServiceUnavailable().body("Admin login is not configured");
        }
    };

    if !bcrypt::verify(&input.password, &hash).unwrap_or(false) {
        return HttpResponse::Unauthorized().body("Wrong password");
    }

    match generate_token() {
        Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
        Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
    }
}

fn generate_token() -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    let now = Utc::now();

    let claims = AdminClaims {
        sub: "owner".to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(12)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}
