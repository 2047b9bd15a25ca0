// src/handlers/broker_clients.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CapBrokerClientsRead, RequireCapability},
    },
    models::broker::{BrokerClientDetail, BrokerClientListResponse, ClientStatus, ClientType},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ClientListQuery {
    // Busca por nombre o e-mail del cliente
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub client_type: Option<ClientType>,
}

// GET /api/broker/clients-new
#[utoipa::path(
    get,
    path = "/api/broker/clients-new",
    tag = "Broker",
    params(ClientListQuery),
    responses(
        (status = 200, description = "Clientes del corredor con métricas", body = BrokerClientListResponse),
        (status = 403, description = "Se requieren permisos de corredor")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerClientsRead>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<BrokerClientListResponse>, AppError> {
    let response = app_state
        .broker_service
        .list_clients(
            user.id,
            query.search.as_deref(),
            query.status,
            query.client_type,
        )
        .await?;

    Ok(Json(response))
}

// GET /api/broker/clients/{client_id}
#[utoipa::path(
    get,
    path = "/api/broker/clients/{client_id}",
    tag = "Broker",
    params(("client_id" = Uuid, Path, description = "ID de la relación corredor-cliente")),
    responses(
        (status = 200, description = "Detalle del cliente", body = BrokerClientDetail),
        (status = 404, description = "Cliente no encontrado o no autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerClientsRead>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<BrokerClientDetail>, AppError> {
    let detail = app_state.broker_service.client_detail(&user, client_id).await?;
    Ok(Json(detail))
}
