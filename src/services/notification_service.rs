// src/services/notification_service.rs
//
// Creación de notificaciones "dispara y olvida": el flujo que gatilla la
// notificación nunca falla por culpa de ella. Cada escritura exitosa se
// publica además en el hub realtime para los clientes SSE conectados.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    db::NotificationRepository,
    models::notification::{NotificationKind, NotificationPriority},
    realtime::{RealtimeEvent, RealtimeHub},
};

#[derive(Debug, Clone)]
pub struct NotifyParams {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub metadata: Option<Value>,
    pub priority: NotificationPriority,
}

impl NotifyParams {
    pub fn new(user_id: Uuid, kind: NotificationKind, title: &str, message: &str) -> Self {
        Self {
            user_id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
            link: None,
            metadata: None,
            priority: NotificationPriority::Medium,
        }
    }

    pub fn with_link(mut self, link: String) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    hub: RealtimeHub,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, hub: RealtimeHub) -> Self {
        Self { repo, hub }
    }

    pub fn repo(&self) -> &NotificationRepository {
        &self.repo
    }

    // Mejor esfuerzo: un insert fallido se registra en el log y nada más
    pub async fn notify(&self, params: NotifyParams) {
        let result = self
            .repo
            .insert(
                params.user_id,
                params.kind.as_str(),
                &params.title,
                &params.message,
                params.link.as_deref(),
                params.metadata.as_ref(),
                params.priority,
            )
            .await;

        match result {
            Ok(notification) => {
                tracing::info!(
                    notification_id = %notification.id,
                    user_id = %params.user_id,
                    kind = params.kind.as_str(),
                    "📬 Notificación creada"
                );
                self.hub.publish(RealtimeEvent {
                    user_id: params.user_id,
                    topic: "notifications".into(),
                    kind: params.kind.as_str().into(),
                    payload: json!({
                        "id": notification.id,
                        "title": notification.title,
                        "message": notification.message,
                        "link": notification.link,
                        "priority": notification.priority,
                        "createdAt": notification.created_at,
                    }),
                });
            }
            Err(e) => {
                tracing::error!(
                    user_id = %params.user_id,
                    kind = params.kind.as_str(),
                    "Error creando notificación: {}",
                    e
                );
            }
        }
    }
}
