// src/models/broker.rs
//
// El grafo corredor / cliente / propiedad: la relación BrokerClient es la
// raíz de agregación; las filas de broker_property_management son los
// registros de autorización por propiedad y la única representación del
// alcance delegado.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Active,
    Inactive,
    Suspended,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    Owner,
    Tenant,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_management_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyManagementType {
    Full,
    Partial,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "management_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagementType {
    Full,
    Partial,
    Marketing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "management_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagementStatus {
    Active,
    Paused,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invitation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invitation_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationType {
    PropertyManagement,
    TenantSearch,
}

// --- RELACIÓN CORREDOR / CLIENTE ---

// Los contadores total_* son valores derivados que se recalculan de forma
// imperativa después de cada flujo que los afecta; entre medio pueden quedar
// desfasados respecto de las filas subyacentes.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerClient {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub user_id: Uuid,
    pub status: ClientStatus,
    pub client_type: ClientType,
    pub property_management_type: PropertyManagementType,
    pub commission_rate: Decimal,
    pub exclusivity: bool,
    pub services_offered: Option<Value>,
    pub notes: Option<String>,
    pub satisfaction_rating: Option<Decimal>,
    pub total_properties_managed: i32,
    pub total_contracts: i32,
    pub total_commissions: Decimal,
    pub last_interaction: Option<DateTime<Utc>>,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Registro de autorización por propiedad bajo gestión del corredor.
// Unicidad esperada sobre (broker_id, client_id, property_id): chequeo de
// existencia antes de insertar, más un índice único parcial como respaldo.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerPropertyManagement {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub client_id: Uuid,
    pub property_id: Uuid,
    pub management_type: ManagementType,
    pub services: Option<Value>,
    pub commission_rate: Decimal,
    pub exclusivity: bool,
    pub status: ManagementStatus,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerInvitation {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub user_id: Uuid,
    pub invitation_type: InvitationType,
    pub services_offered: Option<Value>,
    pub message: Option<String>,
    pub commission_rate: Decimal,
    pub status: InvitationStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- VISTAS DE RESPUESTA ---

// Fila de GET /api/broker/clients-new: la relación más datos del usuario
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerClientSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub status: ClientStatus,
    pub client_type: ClientType,
    pub property_management_type: PropertyManagementType,
    pub commission_rate: Decimal,
    pub total_properties_managed: i32,
    pub total_contracts: i32,
    pub total_commissions: Decimal,
    pub satisfaction_rating: Option<Decimal>,
    pub last_interaction: Option<DateTime<Utc>>,
    pub start_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerClientListResponse {
    pub clients: Vec<BrokerClientSummary>,
    pub total: usize,
    // Métricas agregadas sobre el conjunto filtrado
    pub total_managed_properties: i64,
    pub total_commissions: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerClientDetail {
    #[serde(flatten)]
    pub client: BrokerClient,
    pub managed_properties: Vec<crate::models::property::Property>,
    pub active_contracts: i64,
    pub estimated_monthly_income: Decimal,
}
