// src/models/prospect.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "prospect_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProspectStatus {
    New,
    Contacted,
    Qualified,
    MeetingScheduled,
    ProposalSent,
    Negotiating,
    Converted,
    Lost,
}

impl ProspectStatus {
    // CONVERTED y LOST son terminales para el recálculo masivo de scores
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProspectStatus::Converted | ProspectStatus::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "prospect_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProspectType {
    OwnerLead,
    TenantLead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "prospect_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProspectPriority {
    Low,
    Medium,
    High,
    Urgent,
}

// Lead en etapa previa a convertirse en BrokerClient.
// lead_score y conversion_probability los calcula el servicio de scoring;
// no son invariantes persistidos, solo la última foto calculada.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerProspect {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rut: Option<String>,
    pub prospect_type: ProspectType,
    pub status: ProspectStatus,
    pub priority: ProspectPriority,
    pub source: Option<String>,
    pub budget: Option<Value>,
    pub preferred_locations: Option<Value>,
    pub notes: Option<String>,
    pub lead_score: i32,
    pub conversion_probability: i32,
    pub contact_count: i32,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
    pub lost_reason: Option<String>,
    pub converted_client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Interacciones registradas contra un prospecto (señales de engagement)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProspectActivity {
    pub id: Uuid,
    pub prospect_id: Uuid,
    pub broker_id: Uuid,
    pub activity_type: String,
    pub title: String,
    pub description: Option<String>,
    pub outcome: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProspectSharedProperty {
    pub id: Uuid,
    pub prospect_id: Uuid,
    pub property_id: Uuid,
    pub view_count: i32,
    pub shared_at: DateTime<Utc>,
}
