use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Condition snapshot recorded when the vehicle is handed to the customer.
/// Created exactly once per reservation, before any return protocol.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandoverProtocol {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reservation_id: ObjectId,
    pub mileage: i64,
    /// Fuel gauge reading, 0-100.
    pub fuel_level: i64,
    pub cleanliness: String,
    pub damages: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Condition snapshot recorded when the vehicle comes back. Requires an
/// existing handover protocol; `extra_km_charge` is computed at creation
/// from the odometer delta and the vehicle's daily allowance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReturnProtocol {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reservation_id: ObjectId,
    pub return_mileage: i64,
    pub return_fuel_level: i64,
    pub return_damages: String,
    pub notes: String,
    pub extra_km_charge: i64,
    pub created_at: DateTime<Utc>,
}
