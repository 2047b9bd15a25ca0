// src/handlers/owner.rs
//
// Endpoints del propietario sobre sus relaciones de corretaje.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CapOwnerManagementWrite, RequireCapability},
    },
    models::broker::{BrokerClient, PropertyManagementType},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagePropertiesPayload {
    #[schema(example = "PARTIAL")]
    pub property_management_type: PropertyManagementType,

    // Solo aplica a PARTIAL; FULL usa todas las propiedades del dueño y
    // NONE deja el alcance vacío
    pub managed_property_ids: Option<Vec<Uuid>>,
}

// PUT /api/owner/broker-clients/{client_id}/manage-properties
#[utoipa::path(
    put,
    path = "/api/owner/broker-clients/{client_id}/manage-properties",
    tag = "Owner",
    params(("client_id" = Uuid, Path, description = "ID de la relación corredor-cliente")),
    request_body = ManagePropertiesPayload,
    responses(
        (status = 200, description = "Alcance de gestión actualizado", body = BrokerClient),
        (status = 400, description = "Alguna propiedad no pertenece al solicitante"),
        (status = 404, description = "La relación no existe o no pertenece al solicitante")
    ),
    security(("api_jwt" = []))
)]
pub async fn manage_properties(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapOwnerManagementWrite>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<ManagePropertiesPayload>,
) -> Result<Json<BrokerClient>, AppError> {
    let client = app_state
        .broker_service
        .configure_management_scope(
            &user,
            client_id,
            payload.property_management_type,
            payload.managed_property_ids,
        )
        .await?;

    Ok(Json(client))
}
