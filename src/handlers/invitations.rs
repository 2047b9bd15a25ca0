// src/handlers/invitations.rs
//
// Invitaciones de corretaje: el corredor invita, el usuario acepta o rechaza.
// La aceptación es la que crea (o reactiva) la relación BrokerClient.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CapBrokerInvitationsWrite, CapInvitationsRespond, RequireCapability},
    },
    models::broker::{BrokerInvitation, InvitationType},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationPayload {
    pub user_id: Uuid,

    #[schema(example = "PROPERTY_MANAGEMENT")]
    pub invitation_type: InvitationType,

    #[schema(example = json!(["administración", "cobranza", "visitas"]))]
    pub services_offered: Option<Value>,

    #[validate(length(max = 500, message = "El mensaje no puede superar los 500 caracteres."))]
    pub message: Option<String>,

    #[validate(range(min = 0.0, max = 100.0, message = "La comisión debe estar entre 0 y 100."))]
    #[schema(example = 5.0)]
    pub commission_rate: f64,
}

// POST /api/broker/invitations
#[utoipa::path(
    post,
    path = "/api/broker/invitations",
    tag = "Invitations",
    request_body = CreateInvitationPayload,
    responses(
        (status = 201, description = "Invitación enviada", body = BrokerInvitation),
        (status = 409, description = "Ya existe una invitación pendiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invitation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerInvitationsWrite>,
    Json(payload): Json<CreateInvitationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let commission_rate = Decimal::try_from(payload.commission_rate)
        .map_err(|_| AppError::BusinessRule("Comisión inválida.".into()))?;

    let invitation = app_state
        .broker_service
        .invite_client(
            &user,
            payload.user_id,
            payload.invitation_type,
            payload.services_offered.as_ref(),
            payload.message.as_deref(),
            commission_rate,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

// GET /api/broker/invitations
#[utoipa::path(
    get,
    path = "/api/broker/invitations",
    tag = "Invitations",
    responses((status = 200, description = "Invitaciones enviadas por el corredor", body = Vec<BrokerInvitation>)),
    security(("api_jwt" = []))
)]
pub async fn list_broker_invitations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerInvitationsWrite>,
) -> Result<Json<Vec<BrokerInvitation>>, AppError> {
    let invitations = app_state.broker_service.list_invitations(user.id).await?;
    Ok(Json(invitations))
}

// GET /api/owner/invitations
#[utoipa::path(
    get,
    path = "/api/owner/invitations",
    tag = "Invitations",
    responses((status = 200, description = "Invitaciones pendientes del usuario", body = Vec<BrokerInvitation>)),
    security(("api_jwt" = []))
)]
pub async fn list_pending_invitations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapInvitationsRespond>,
) -> Result<Json<Vec<BrokerInvitation>>, AppError> {
    let invitations = app_state.broker_service.pending_invitations_for(user.id).await?;
    Ok(Json(invitations))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RespondInvitationPayload {
    pub accept: bool,
}

// POST /api/owner/invitations/{invitation_id}/respond
#[utoipa::path(
    post,
    path = "/api/owner/invitations/{invitation_id}/respond",
    tag = "Invitations",
    params(("invitation_id" = Uuid, Path, description = "ID de la invitación")),
    request_body = RespondInvitationPayload,
    responses(
        (status = 200, description = "Invitación respondida; al aceptar queda activa la relación"),
        (status = 404, description = "Invitación no encontrada"),
        (status = 400, description = "La invitación ya fue respondida")
    ),
    security(("api_jwt" = []))
)]
pub async fn respond_invitation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapInvitationsRespond>,
    Path(invitation_id): Path<Uuid>,
    Json(payload): Json<RespondInvitationPayload>,
) -> Result<Json<Value>, AppError> {
    let (invitation, client) = app_state
        .broker_service
        .respond_invitation(&user, invitation_id, payload.accept)
        .await?;

    Ok(Json(json!({
        "invitation": invitation,
        "client": client,
    })))
}
