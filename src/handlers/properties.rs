// src/handlers/properties.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::{CapPropertiesWrite, RequireCapability}},
    models::property::{Property, PropertyDetail, PropertyType},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyPayload {
    #[validate(length(min = 3, message = "El título debe tener al menos 3 caracteres."))]
    #[schema(example = "Departamento 2D2B en Providencia")]
    pub title: String,

    #[validate(length(min = 5, message = "La dirección debe tener al menos 5 caracteres."))]
    #[schema(example = "Av. Providencia 1234, depto 501")]
    pub address: String,

    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Santiago")]
    pub city: String,

    #[schema(example = "Providencia")]
    pub commune: Option<String>,

    #[schema(example = "Metropolitana")]
    pub region: Option<String>,

    #[schema(example = "650000")]
    pub price: Decimal,

    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,

    #[serde(rename = "type")]
    #[schema(example = "APARTMENT")]
    pub property_type: PropertyType,

    // URLs de imágenes; van a la tabla hija
    #[serde(default)]
    pub images: Vec<String>,
}

// POST /api/properties
#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = CreatePropertyPayload,
    responses(
        (status = 201, description = "Propiedad creada", body = Property),
        (status = 400, description = "Datos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _cap: RequireCapability<CapPropertiesWrite>,
    Json(payload): Json<CreatePropertyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let property = app_state
        .property_repo
        .create(
            user.id,
            &payload.title,
            &payload.address,
            &payload.city,
            payload.commune.as_deref(),
            payload.region.as_deref(),
            payload.price,
            payload.bedrooms,
            payload.bathrooms,
            payload.property_type,
        )
        .await?;

    for (position, url) in payload.images.iter().enumerate() {
        app_state
            .property_repo
            .add_image(property.id, url, position as i32)
            .await?;
    }

    tracing::info!(property_id = %property.id, owner_id = %user.id, "Propiedad creada");
    Ok((StatusCode::CREATED, Json(property)))
}

// GET /api/properties
#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    responses((status = 200, description = "Propiedades del solicitante", body = Vec<Property>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_properties(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Property>>, AppError> {
    let properties = app_state.property_repo.list_by_owner(user.id).await?;
    Ok(Json(properties))
}

// GET /api/properties/{property_id}
#[utoipa::path(
    get,
    path = "/api/properties/{property_id}",
    tag = "Properties",
    params(("property_id" = Uuid, Path, description = "ID de la propiedad")),
    responses(
        (status = 200, description = "Detalle con imágenes", body = PropertyDetail),
        (status = 404, description = "Propiedad no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> Result<Json<PropertyDetail>, AppError> {
    let property = app_state
        .property_repo
        .find_by_id(property_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Propiedad".into()))?;
    let images = app_state.property_repo.list_images(property_id).await?;

    Ok(Json(PropertyDetail { property, images }))
}
