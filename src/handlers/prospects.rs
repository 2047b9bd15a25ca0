// src/handlers/prospects.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CapBrokerProspectsRead, CapBrokerProspectsWrite, RequireCapability},
    },
    models::prospect::{
        BrokerProspect, ProspectPriority, ProspectStatus, ProspectType,
    },
    services::{lead_scoring::LeadScoreResult, prospect_service::StatusChangeRequest},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProspectListQuery {
    pub status: Option<ProspectStatus>,
}

// GET /api/broker/prospects
#[utoipa::path(
    get,
    path = "/api/broker/prospects",
    tag = "Prospects",
    params(ProspectListQuery),
    responses((status = 200, description = "Prospectos del corredor", body = Vec<BrokerProspect>)),
    security(("api_jwt" = []))
)]
pub async fn list_prospects(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsRead>,
    Query(query): Query<ProspectListQuery>,
) -> Result<Json<Vec<BrokerProspect>>, AppError> {
    let prospects = app_state.prospect_service.list(user.id, query.status).await?;
    Ok(Json(prospects))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProspectPayload {
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres."))]
    #[schema(example = "Jorge Soto")]
    pub name: String,

    #[validate(email(message = "El e-mail entregado es inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rut: Option<String>,

    #[schema(example = "OWNER_LEAD")]
    pub prospect_type: ProspectType,

    #[schema(example = "referral")]
    pub source: Option<String>,

    #[schema(example = json!({"min": 400000, "max": 800000}))]
    pub budget: Option<Value>,

    #[schema(example = json!(["Providencia", "Ñuñoa"]))]
    pub preferred_locations: Option<Value>,

    pub notes: Option<String>,
}

// POST /api/broker/prospects
#[utoipa::path(
    post,
    path = "/api/broker/prospects",
    tag = "Prospects",
    request_body = CreateProspectPayload,
    responses(
        (status = 201, description = "Prospecto creado", body = BrokerProspect),
        (status = 400, description = "Datos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_prospect(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsWrite>,
    Json(payload): Json<CreateProspectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let prospect = app_state
        .prospect_service
        .create(
            user.id,
            &payload.name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.rut.as_deref(),
            payload.prospect_type,
            payload.source.as_deref(),
            payload.budget.as_ref(),
            payload.preferred_locations.as_ref(),
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(prospect)))
}

// GET /api/broker/prospects/{prospect_id}
#[utoipa::path(
    get,
    path = "/api/broker/prospects/{prospect_id}",
    tag = "Prospects",
    params(("prospect_id" = Uuid, Path, description = "ID del prospecto")),
    responses(
        (status = 200, description = "Detalle del prospecto", body = BrokerProspect),
        (status = 404, description = "Prospecto no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_prospect(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(prospect_id): Path<Uuid>,
) -> Result<Json<BrokerProspect>, AppError> {
    // La autorización es por fila: el corredor dueño, o el propietario al
    // que apunta el prospecto
    let prospect = app_state.prospect_service.get_authorized(&user, prospect_id).await?;
    Ok(Json(prospect))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProspectPayload {
    pub priority: Option<ProspectPriority>,
    pub notes: Option<String>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
}

// PATCH /api/broker/prospects/{prospect_id}
#[utoipa::path(
    patch,
    path = "/api/broker/prospects/{prospect_id}",
    tag = "Prospects",
    params(("prospect_id" = Uuid, Path, description = "ID del prospecto")),
    request_body = UpdateProspectPayload,
    responses((status = 200, description = "Prospecto actualizado", body = BrokerProspect)),
    security(("api_jwt" = []))
)]
pub async fn update_prospect(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsWrite>,
    Path(prospect_id): Path<Uuid>,
    Json(payload): Json<UpdateProspectPayload>,
) -> Result<Json<BrokerProspect>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let prospect = app_state
        .prospect_service
        .update_follow_up(
            &user,
            prospect_id,
            payload.priority,
            payload.notes.as_deref(),
            payload.next_follow_up_date,
        )
        .await?;
    Ok(Json(prospect))
}

// DELETE /api/broker/prospects/{prospect_id}
#[utoipa::path(
    delete,
    path = "/api/broker/prospects/{prospect_id}",
    tag = "Prospects",
    params(("prospect_id" = Uuid, Path, description = "ID del prospecto")),
    responses(
        (status = 200, description = "Prospecto eliminado"),
        (status = 400, description = "No se puede eliminar un prospecto convertido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_prospect(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsWrite>,
    Path(prospect_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.prospect_service.delete(&user, prospect_id).await?;
    Ok(Json(json!({ "success": true })))
}

// GET /api/broker/prospects/{prospect_id}/status
#[utoipa::path(
    get,
    path = "/api/broker/prospects/{prospect_id}/status",
    tag = "Prospects",
    params(("prospect_id" = Uuid, Path, description = "ID del prospecto")),
    responses((status = 200, description = "Estado actual del prospecto")),
    security(("api_jwt" = []))
)]
pub async fn get_prospect_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsRead>,
    Path(prospect_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let prospect = app_state.prospect_service.get_authorized(&user, prospect_id).await?;
    Ok(Json(json!({
        "status": prospect.status,
        "convertedAt": prospect.converted_at,
        "lostReason": prospect.lost_reason,
        "contactCount": prospect.contact_count,
        "lastContactDate": prospect.last_contact_date,
    })))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    // serde rechaza valores fuera del enum; no hay tabla de transiciones
    #[schema(example = "QUALIFIED")]
    pub status: ProspectStatus,
    pub notes: Option<String>,
    #[schema(example = "Eligió otra corredora")]
    pub lost_reason: Option<String>,
}

// PATCH /api/broker/prospects/{prospect_id}/status
#[utoipa::path(
    patch,
    path = "/api/broker/prospects/{prospect_id}/status",
    tag = "Prospects",
    params(("prospect_id" = Uuid, Path, description = "ID del prospecto")),
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Estado actualizado", body = BrokerProspect),
        (status = 403, description = "El prospecto pertenece a otro corredor")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_prospect_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsWrite>,
    Path(prospect_id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<Json<BrokerProspect>, AppError> {
    let prospect = app_state
        .prospect_service
        .change_status(
            &user,
            prospect_id,
            StatusChangeRequest {
                status: payload.status,
                notes: payload.notes,
                lost_reason: payload.lost_reason,
            },
        )
        .await?;
    Ok(Json(prospect))
}

// GET /api/broker/prospects/{prospect_id}/calculate-score
#[utoipa::path(
    get,
    path = "/api/broker/prospects/{prospect_id}/calculate-score",
    tag = "Prospects",
    params(("prospect_id" = Uuid, Path, description = "ID del prospecto")),
    responses((status = 200, description = "Score vigente sin recalcular", body = LeadScoreResult)),
    security(("api_jwt" = []))
)]
pub async fn get_prospect_score(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsRead>,
    Path(prospect_id): Path<Uuid>,
) -> Result<Json<LeadScoreResult>, AppError> {
    let prospect = app_state.prospect_service.get_authorized(&user, prospect_id).await?;
    let result = app_state.lead_scoring.calculate(&prospect).await?;
    Ok(Json(result))
}

// POST /api/broker/prospects/{prospect_id}/calculate-score
#[utoipa::path(
    post,
    path = "/api/broker/prospects/{prospect_id}/calculate-score",
    tag = "Prospects",
    params(("prospect_id" = Uuid, Path, description = "ID del prospecto")),
    responses((status = 200, description = "Score recalculado y persistido", body = LeadScoreResult)),
    security(("api_jwt" = []))
)]
pub async fn recalculate_prospect_score(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsWrite>,
    Path(prospect_id): Path<Uuid>,
) -> Result<Json<LeadScoreResult>, AppError> {
    let prospect = app_state.prospect_service.get_authorized(&user, prospect_id).await?;
    let result = app_state.lead_scoring.recalculate_and_persist(&prospect).await?;
    Ok(Json(result))
}

// POST /api/broker/prospects/recalculate-scores
#[utoipa::path(
    post,
    path = "/api/broker/prospects/recalculate-scores",
    tag = "Prospects",
    responses((status = 200, description = "Scores recalculados para los prospectos vigentes")),
    security(("api_jwt" = []))
)]
pub async fn recalculate_all_scores(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapBrokerProspectsWrite>,
) -> Result<Json<Value>, AppError> {
    let updated = app_state.lead_scoring.recalculate_all(user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}
