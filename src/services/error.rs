use actix_web::HttpResponse;

/// Error taxonomy for the booking core. Validation and conflict errors are
/// surfaced to the customer as blocking messages; precondition failures go
/// to the owner in the admin surface; collaborator outages follow the
/// caller's policy (see ReservationService::create).
#[derive(Debug)]
pub enum BookingError {
    Validation(String),
    Conflict(String),
    PreconditionFailed(String),
    CollaboratorUnavailable(String),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::Validation(msg) => write!(f, "Validation error: {}", msg),
            BookingError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            BookingError::PreconditionFailed(msg) => write!(f, "Precondition failed: {}", msg),
            BookingError::CollaboratorUnavailable(msg) => {
                write!(f, "Collaborator unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookingError {}

impl From<mongodb::error::Error> for BookingError {
    fn from(err: mongodb::error::Error) -> Self {
        BookingError::CollaboratorUnavailable(err.to_string())
    }
}

impl BookingError {
    pub fn to_response(&self) -> HttpResponse {
        match self {
            BookingError::Validation(msg) => HttpResponse::BadRequest().body(msg.clone()),
            BookingError::Conflict(msg) => HttpResponse::Conflict().body(msg.clone()),
            BookingError::PreconditionFailed(msg) => {
                HttpResponse::PreconditionFailed().body(msg.clone())
            }
            BookingError::CollaboratorUnavailable(msg) => {
                HttpResponse::ServiceUnavailable().body(msg.clone())
            }
        }
    }
}
