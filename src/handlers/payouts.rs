// src/handlers/payouts.rs
//
// Cálculo de payouts para runners y proveedores. El GET lista el cálculo;
// el POST además notifica a cada destinatario. La paginación corta después
// de agregar el período completo.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{
        error::AppError,
        pagination::{paginate, PageParams, Paginated},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CapAdminPayoutsProcess, CapAdminPayoutsRead, RequireCapability},
    },
    models::payout::{PayoutCalculation, PayoutReport},
};

// Sin fechas el período queda "pendiente": abierto hacia atrás, hasta ahora
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutPeriodPayload {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn page_of(report: PayoutReport, params: &PageParams) -> Paginated<PayoutCalculation> {
    paginate(report.payouts, params)
}

// GET /api/admin/runners/payouts
#[utoipa::path(
    get,
    path = "/api/admin/runners/payouts",
    tag = "Payouts",
    params(PageParams),
    responses(
        (status = 200, description = "Payouts pendientes de runners"),
        (status = 403, description = "Se requieren permisos de administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_runner_payouts(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _cap: RequireCapability<CapAdminPayoutsRead>,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<PayoutCalculation>>, AppError> {
    let report = app_state.payout_service.runner_report(None, None).await?;
    Ok(Json(page_of(report, &page)))
}

// POST /api/admin/runners/payouts
#[utoipa::path(
    post,
    path = "/api/admin/runners/payouts",
    tag = "Payouts",
    request_body = PayoutPeriodPayload,
    responses((status = 200, description = "Payouts calculados y notificados", body = PayoutReport)),
    security(("api_jwt" = []))
)]
pub async fn process_runner_payouts(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _cap: RequireCapability<CapAdminPayoutsProcess>,
    Json(payload): Json<PayoutPeriodPayload>,
) -> Result<Json<PayoutReport>, AppError> {
    let report = app_state
        .payout_service
        .process_runner_payouts(payload.start_date, payload.end_date)
        .await?;
    Ok(Json(report))
}

// GET /api/admin/providers/payouts
#[utoipa::path(
    get,
    path = "/api/admin/providers/payouts",
    tag = "Payouts",
    params(PageParams),
    responses(
        (status = 200, description = "Payouts pendientes de proveedores"),
        (status = 403, description = "Se requieren permisos de administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_provider_payouts(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _cap: RequireCapability<CapAdminPayoutsRead>,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<PayoutCalculation>>, AppError> {
    let report = app_state.payout_service.provider_report(None, None).await?;
    Ok(Json(page_of(report, &page)))
}

// POST /api/admin/providers/payouts
#[utoipa::path(
    post,
    path = "/api/admin/providers/payouts",
    tag = "Payouts",
    request_body = PayoutPeriodPayload,
    responses((status = 200, description = "Payouts calculados y notificados", body = PayoutReport)),
    security(("api_jwt" = []))
)]
pub async fn process_provider_payouts(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _cap: RequireCapability<CapAdminPayoutsProcess>,
    Json(payload): Json<PayoutPeriodPayload>,
) -> Result<Json<PayoutReport>, AppError> {
    let report = app_state
        .payout_service
        .process_provider_payouts(payload.start_date, payload.end_date)
        .await?;
    Ok(Json(report))
}
