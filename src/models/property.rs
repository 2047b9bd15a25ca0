// src/models/property.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Pending,
    Available,
    Rented,
    Managed,
    Maintenance,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Apartment,
    House,
    Office,
    Commercial,
    Land,
}

// Invariante: broker_id poblado implica una fila ACTIVE en
// broker_property_management para esta propiedad (mantenido imperativamente).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub broker_id: Option<Uuid>,
    pub title: String,
    pub address: String,
    pub city: String,
    pub commune: Option<String>,
    pub region: Option<String>,
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Tabla hija: reemplaza al campo `images` serializado como JSON del sistema anterior
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub url: String,
    pub position: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub images: Vec<PropertyImage>,
}
