use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Generated rental contract text, immutable once saved.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SavedContract {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reservation_id: ObjectId,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
}
