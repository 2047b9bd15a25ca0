// src/handlers/operations.rs
//
// Handlers transaccionales: contratos, visitas, trabajos y mantenimiento.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{
            CapContractsRead, CapContractsWrite, CapMaintenanceWrite, CapProviderJobsWrite,
            CapRunnerVisitsWrite, RequireCapability,
        },
    },
    models::operations::{
        Contract, MaintenanceRequest, MaintenanceStatus, ServiceJob, Visit,
    },
};

// =============================================================================
//  CONTRATOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractPayload {
    pub property_id: Uuid,
    pub tenant_id: Uuid,

    #[schema(example = "650000")]
    pub monthly_rent: Decimal,

    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Operations",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato creado", body = Contract),
        (status = 400, description = "La propiedad no pertenece al solicitante")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapContractsWrite>,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let contract = app_state
        .operations_service
        .create_contract(
            &user,
            payload.property_id,
            payload.tenant_id,
            payload.monthly_rent,
            payload.start_date,
            payload.end_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(contract)))
}

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Operations",
    responses((status = 200, description = "Contratos del solicitante según su rol", body = Vec<Contract>)),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapContractsRead>,
) -> Result<Json<Vec<Contract>>, AppError> {
    let contracts = app_state.operations_service.list_contracts(&user).await?;
    Ok(Json(contracts))
}

// =============================================================================
//  VISITAS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleVisitPayload {
    pub property_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
}

// POST /api/runner/visits
#[utoipa::path(
    post,
    path = "/api/runner/visits",
    tag = "Operations",
    request_body = ScheduleVisitPayload,
    responses((status = 201, description = "Visita agendada", body = Visit)),
    security(("api_jwt" = []))
)]
pub async fn schedule_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapRunnerVisitsWrite>,
    Json(payload): Json<ScheduleVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state
        .operations_service
        .schedule_visit(&user, payload.property_id, payload.scheduled_at)
        .await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteVisitPayload {
    #[validate(range(min = 1, message = "La duración debe ser positiva."))]
    #[schema(example = 45)]
    pub duration_minutes: i32,

    #[serde(default)]
    pub photos_taken: i32,
}

// POST /api/runner/visits/{visit_id}/complete
#[utoipa::path(
    post,
    path = "/api/runner/visits/{visit_id}/complete",
    tag = "Operations",
    params(("visit_id" = Uuid, Path, description = "ID de la visita")),
    request_body = CompleteVisitPayload,
    responses(
        (status = 200, description = "Visita completada con ganancias calculadas", body = Visit),
        (status = 400, description = "La visita ya fue completada o cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapRunnerVisitsWrite>,
    Path(visit_id): Path<Uuid>,
    Json(payload): Json<CompleteVisitPayload>,
) -> Result<Json<Visit>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let visit = app_state
        .operations_service
        .complete_visit(&user, visit_id, payload.duration_minutes, payload.photos_taken)
        .await?;
    Ok(Json(visit))
}

// GET /api/runner/visits
#[utoipa::path(
    get,
    path = "/api/runner/visits",
    tag = "Operations",
    responses((status = 200, description = "Visitas del runner", body = Vec<Visit>)),
    security(("api_jwt" = []))
)]
pub async fn list_visits(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapRunnerVisitsWrite>,
) -> Result<Json<Vec<Visit>>, AppError> {
    let visits = app_state.operations_service.list_visits(&user).await?;
    Ok(Json(visits))
}

// =============================================================================
//  TRABAJOS DE SERVICIO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    pub property_id: Uuid,

    #[validate(length(min = 5, message = "La descripción debe tener al menos 5 caracteres."))]
    pub description: String,

    #[schema(example = "gasfitería")]
    pub job_type: String,

    pub quoted_price: Option<Decimal>,
}

// POST /api/provider/jobs
#[utoipa::path(
    post,
    path = "/api/provider/jobs",
    tag = "Operations",
    request_body = CreateJobPayload,
    responses((status = 201, description = "Trabajo registrado", body = ServiceJob)),
    security(("api_jwt" = []))
)]
pub async fn create_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapProviderJobsWrite>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let job = app_state
        .operations_service
        .create_job(
            &user,
            payload.property_id,
            &payload.description,
            &payload.job_type,
            payload.quoted_price,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobPayload {
    #[schema(example = "85000")]
    pub final_price: Decimal,
}

// POST /api/provider/jobs/{job_id}/complete
#[utoipa::path(
    post,
    path = "/api/provider/jobs/{job_id}/complete",
    tag = "Operations",
    params(("job_id" = Uuid, Path, description = "ID del trabajo")),
    request_body = CompleteJobPayload,
    responses((status = 200, description = "Trabajo completado", body = ServiceJob)),
    security(("api_jwt" = []))
)]
pub async fn complete_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapProviderJobsWrite>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<CompleteJobPayload>,
) -> Result<Json<ServiceJob>, AppError> {
    let job = app_state
        .operations_service
        .complete_job(&user, job_id, payload.final_price)
        .await?;
    Ok(Json(job))
}

// GET /api/provider/jobs
#[utoipa::path(
    get,
    path = "/api/provider/jobs",
    tag = "Operations",
    responses((status = 200, description = "Trabajos del proveedor", body = Vec<ServiceJob>)),
    security(("api_jwt" = []))
)]
pub async fn list_jobs(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapProviderJobsWrite>,
) -> Result<Json<Vec<ServiceJob>>, AppError> {
    let jobs = app_state.operations_service.list_jobs(&user).await?;
    Ok(Json(jobs))
}

// =============================================================================
//  MANTENIMIENTO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenancePayload {
    pub property_id: Uuid,

    #[validate(length(min = 3, message = "El título debe tener al menos 3 caracteres."))]
    #[schema(example = "Filtración en el baño")]
    pub title: String,

    #[validate(length(min = 10, message = "La descripción debe tener al menos 10 caracteres."))]
    pub description: String,

    #[serde(default = "default_priority")]
    #[schema(example = "medium")]
    pub priority: String,

    pub estimated_cost: Option<Decimal>,
}

fn default_priority() -> String {
    "medium".to_string()
}

// POST /api/maintenance
#[utoipa::path(
    post,
    path = "/api/maintenance",
    tag = "Operations",
    request_body = CreateMaintenancePayload,
    responses((status = 201, description = "Solicitud creada", body = MaintenanceRequest)),
    security(("api_jwt" = []))
)]
pub async fn create_maintenance(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapMaintenanceWrite>,
    Json(payload): Json<CreateMaintenancePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let request = app_state
        .operations_service
        .create_maintenance(
            &user,
            payload.property_id,
            &payload.title,
            &payload.description,
            &payload.priority,
            payload.estimated_cost,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/maintenance/{request_id}
//
// El acceso es por fila: solicitante, dueño de la propiedad, corredor con
// gestión activa sobre ella o proveedor asignado.
#[utoipa::path(
    get,
    path = "/api/maintenance/{request_id}",
    tag = "Operations",
    params(("request_id" = Uuid, Path, description = "ID de la solicitud")),
    responses(
        (status = 200, description = "Solicitud de mantenimiento", body = MaintenanceRequest),
        (status = 403, description = "Sin relación con la solicitud")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_maintenance(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    let request = app_state
        .operations_service
        .get_maintenance(&user, request_id)
        .await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenancePayload {
    #[schema(example = "COMPLETED")]
    pub status: MaintenanceStatus,
    pub actual_cost: Option<Decimal>,
}

// PATCH /api/maintenance/{request_id}/status
#[utoipa::path(
    patch,
    path = "/api/maintenance/{request_id}/status",
    tag = "Operations",
    params(("request_id" = Uuid, Path, description = "ID de la solicitud")),
    request_body = UpdateMaintenancePayload,
    responses((status = 200, description = "Estado actualizado", body = MaintenanceRequest)),
    security(("api_jwt" = []))
)]
pub async fn update_maintenance_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<UpdateMaintenancePayload>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    let request = app_state
        .operations_service
        .update_maintenance_status(&user, request_id, payload.status, payload.actual_cost)
        .await?;
    Ok(Json(request))
}
