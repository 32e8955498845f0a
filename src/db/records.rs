use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::contract::SavedContract;
use crate::models::customer::Customer;
use crate::models::protocol::{HandoverProtocol, ReturnProtocol};
use crate::models::reservation::{Reservation, ReservationStatus};
use crate::models::vehicle::{SeasonRule, Vehicle};
use crate::services::error::BookingError;

/// Wire shape of the hosted store: flat snake_cased documents with ISO date
/// strings and status strings, distinct from the core model. All mapping
/// between the two shapes happens here and nowhere else.

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, BookingError> {
    value.parse().map_err(|_| {
        BookingError::Validation(format!("Stored record has malformed {}: {}", field, value))
    })
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SeasonRuleRecord {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub price_per_day: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VehicleRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub license_plate: String,
    pub vin: Option<String>,
    pub base_price: i64,
    pub min_days: i64,
    pub deposit: i64,
    pub km_limit_per_day: i64,
    pub images: Vec<String>,
    pub is_active: bool,
    pub seasonal_pricing: Vec<SeasonRuleRecord>,
    pub equipment: Vec<String>,
}

impl From<&Vehicle> for VehicleRecord {
    fn from(v: &Vehicle) -> Self {
        VehicleRecord {
            id: v.id,
            name: v.name.clone(),
            description: v.description.clone(),
            license_plate: v.license_plate.clone(),
            vin: v.vin.clone(),
            base_price: v.base_price,
            min_days: v.min_days,
            deposit: v.deposit,
            km_limit_per_day: v.km_limit_per_day,
            images: v.images.clone(),
            is_active: v.is_active,
            seasonal_pricing: v
                .seasonal_pricing
                .iter()
                .map(|rule| SeasonRuleRecord {
                    id: rule.id.clone(),
                    name: rule.name.clone(),
                    start_date: rule.start_date.to_string(),
                    end_date: rule.end_date.to_string(),
                    price_per_day: rule.price_per_day,
                })
                .collect(),
            equipment: v.equipment.clone(),
        }
    }
}

impl TryFrom<VehicleRecord> for Vehicle {
    type Error = BookingError;

    fn try_from(record: VehicleRecord) -> Result<Self, Self::Error> {
        let mut seasonal_pricing = Vec::with_capacity(record.seasonal_pricing.len());
        for rule in record.seasonal_pricing {
            seasonal_pricing.push(SeasonRule {
                start_date: parse_date("season start_date", &rule.start_date)?,
                end_date: parse_date("season end_date", &rule.end_date)?,
                id: rule.id,
                name: rule.name,
                price_per_day: rule.price_per_day,
            });
        }
        Ok(Vehicle {
            id: record.id,
            name: record.name,
            description: record.description,
            license_plate: record.license_plate,
            vin: record.vin,
            base_price: record.base_price,
            min_days: record.min_days,
            deposit: record.deposit,
            km_limit_per_day: record.km_limit_per_day,
            images: record.images,
            is_active: record.is_active,
            seasonal_pricing,
            equipment: record.equipment,
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReservationRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub vehicle_id: ObjectId,
    pub customer_id: ObjectId,
    pub start_date: String,
    pub end_date: String,
    pub total_price: i64,
    pub deposit: i64,
    pub status: String,
    pub created_at: bson::DateTime,
    pub customer_note: Option<String>,
    pub idempotency_key: Option<String>,
}

impl From<&Reservation> for ReservationRecord {
    fn from(r: &Reservation) -> Self {
        ReservationRecord {
            id: r.id,
            vehicle_id: r.vehicle_id,
            customer_id: r.customer_id,
            start_date: r.start_date.to_string(),
            end_date: r.end_date.to_string(),
            total_price: r.total_price,
            deposit: r.deposit,
            status: r.status.as_str().to_string(),
            created_at: bson::DateTime::from_chrono(r.created_at),
            customer_note: r.customer_note.clone(),
            idempotency_key: r.idempotency_key.clone(),
        }
    }
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = BookingError;

    fn try_from(record: ReservationRecord) -> Result<Self, Self::Error> {
        let status = ReservationStatus::parse(&record.status).ok_or_else(|| {
            BookingError::Validation(format!(
                "Stored record has unknown status: {}",
                record.status
            ))
        })?;
        Ok(Reservation {
            start_date: parse_date("start_date", &record.start_date)?,
            end_date: parse_date("end_date", &record.end_date)?,
            id: record.id,
            vehicle_id: record.vehicle_id,
            customer_id: record.customer_id,
            total_price: record.total_price,
            deposit: record.deposit,
            status,
            created_at: record.created_at.to_chrono(),
            customer_note: record.customer_note,
            idempotency_key: record.idempotency_key,
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CustomerRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub id_number: Option<String>,
}

impl From<&Customer> for CustomerRecord {
    fn from(c: &Customer) -> Self {
        CustomerRecord {
            id: c.id,
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            id_number: c.id_number.clone(),
        }
    }
}

impl From<CustomerRecord> for Customer {
    fn from(record: CustomerRecord) -> Self {
        Customer {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            address: record.address,
            id_number: record.id_number,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HandoverRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reservation_id: ObjectId,
    pub mileage: i64,
    pub fuel_level: i64,
    pub cleanliness: String,
    pub damages: String,
    pub notes: String,
    pub created_at: bson::DateTime,
}

impl From<&HandoverProtocol> for HandoverRecord {
    fn from(p: &HandoverProtocol) -> Self {
        HandoverRecord {
            id: p.id,
            reservation_id: p.reservation_id,
            mileage: p.mileage,
            fuel_level: p.fuel_level,
            cleanliness: p.cleanliness.clone(),
            damages: p.damages.clone(),
            notes: p.notes.clone(),
            created_at: bson::DateTime::from_chrono(p.created_at),
        }
    }
}

impl From<HandoverRecord> for HandoverProtocol {
    fn from(record: HandoverRecord) -> Self {
        HandoverProtocol {
            id: record.id,
            reservation_id: record.reservation_id,
            mileage: record.mileage,
            fuel_level: record.fuel_level,
            cleanliness: record.cleanliness,
            damages: record.damages,
            notes: record.notes,
            created_at: record.created_at.to_chrono(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReturnRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reservation_id: ObjectId,
    pub return_mileage: i64,
    pub return_fuel_level: i64,
    pub return_damages: String,
    pub notes: String,
    pub extra_km_charge: i64,
    pub created_at: bson::DateTime,
}

impl From<&ReturnProtocol> for ReturnRecord {
    fn from(p: &ReturnProtocol) -> Self {
        ReturnRecord {
            id: p.id,
            reservation_id: p.reservation_id,
            return_mileage: p.return_mileage,
            return_fuel_level: p.return_fuel_level,
            return_damages: p.return_damages.clone(),
            notes: p.notes.clone(),
            extra_km_charge: p.extra_km_charge,
            created_at: bson::DateTime::from_chrono(p.created_at),
        }
    }
}

impl From<ReturnRecord> for ReturnProtocol {
    fn from(record: ReturnRecord) -> Self {
        ReturnProtocol {
            id: record.id,
            reservation_id: record.reservation_id,
            return_mileage: record.return_mileage,
            return_fuel_level: record.return_fuel_level,
            return_damages: record.return_damages,
            notes: record.notes,
            extra_km_charge: record.extra_km_charge,
            created_at: record.created_at.to_chrono(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ContractRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reservation_id: ObjectId,
    pub customer_name: String,
    pub created_at: bson::DateTime,
    pub content: String,
}

impl From<&SavedContract> for ContractRecord {
    fn from(c: &SavedContract) -> Self {
        ContractRecord {
            id: c.id,
            reservation_id: c.reservation_id,
            customer_name: c.customer_name.clone(),
            created_at: bson::DateTime::from_chrono(c.created_at),
            content: c.content.clone(),
        }
    }
}

impl From<ContractRecord> for SavedContract {
    fn from(record: ContractRecord) -> Self {
        SavedContract {
            id: record.id,
            reservation_id: record.reservation_id,
            customer_name: record.customer_name,
            created_at: record.created_at.to_chrono(),
            content: record.content,
        }
    }
}
