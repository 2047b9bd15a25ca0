// src/handlers/notifications.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::notification::Notification,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
}

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    params(NotificationListQuery),
    responses((status = 200, description = "Notificaciones del usuario", body = Vec<Notification>)),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = app_state
        .notification_service
        .repo()
        .list_for_user(user.id, query.unread_only)
        .await?;
    Ok(Json(notifications))
}

// POST /api/notifications/{notification_id}/read
#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    tag = "Notifications",
    params(("notification_id" = Uuid, Path, description = "ID de la notificación")),
    responses(
        (status = 200, description = "Notificación marcada como leída"),
        (status = 404, description = "Notificación no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let marked = app_state
        .notification_service
        .repo()
        .mark_read(notification_id, user.id)
        .await?;

    if !marked {
        return Err(AppError::ResourceNotFound("Notificación".into()));
    }
    Ok(Json(json!({ "success": true })))
}

// POST /api/notifications/read-all
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    responses((status = 200, description = "Todas las notificaciones quedaron leídas")),
    security(("api_jwt" = []))
)]
pub async fn mark_all_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let updated = app_state
        .notification_service
        .repo()
        .mark_all_read(user.id)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}
