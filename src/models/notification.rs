// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Taxonomía de eventos que generan una notificación.
// Se guarda como texto para no migrar el enum de Postgres con cada evento nuevo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    InvitationReceived,
    InvitationAccepted,
    InvitationRejected,
    ProspectConverted,
    ProspectActivity,
    CommissionCalculated,
    PayoutReady,
    MaintenanceUpdate,
    NewMessage,
    SystemAlert,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::InvitationReceived => "INVITATION_RECEIVED",
            NotificationKind::InvitationAccepted => "INVITATION_ACCEPTED",
            NotificationKind::InvitationRejected => "INVITATION_REJECTED",
            NotificationKind::ProspectConverted => "PROSPECT_CONVERTED",
            NotificationKind::ProspectActivity => "PROSPECT_ACTIVITY",
            NotificationKind::CommissionCalculated => "COMMISSION_CALCULATED",
            NotificationKind::PayoutReady => "PAYOUT_READY",
            NotificationKind::MaintenanceUpdate => "MAINTENANCE_UPDATE",
            NotificationKind::NewMessage => "NEW_MESSAGE",
            NotificationKind::SystemAlert => "SYSTEM_ALERT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub metadata: Option<Value>,
    pub priority: NotificationPriority,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
