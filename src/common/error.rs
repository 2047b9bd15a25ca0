use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// El tipo de error de la aplicación, con `thiserror` para mejor ergonomía.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("El e-mail ya está registrado")]
    EmailAlreadyExists,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Cuenta deshabilitada")]
    AccountDisabled,

    // El string lleva el slug de la capacidad que faltó
    #[error("Acceso denegado: se requiere '{0}'")]
    AccessDenied(String),

    #[error("{0} no encontrado")]
    ResourceNotFound(String),

    #[error("Recurso duplicado: {0}")]
    DuplicateResource(String),

    #[error("{0}")]
    BusinessRule(String),

    // Variante para errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    // `anyhow::Error` captura el contexto del error.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devuelve todos los detalles de la validación, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail ya está en uso.".to_string())
            }
            AppError::DuplicateResource(what) => (StatusCode::CONFLICT, what),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail o contraseña inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticación inválido o ausente.".to_string(),
            ),
            AppError::AccountDisabled => {
                (StatusCode::UNAUTHORIZED, "La cuenta está deshabilitada.".to_string())
            }
            AppError::AccessDenied(ref perm) => (
                StatusCode::FORBIDDEN,
                format!("Acceso denegado. Se requiere el permiso '{}'.", perm),
            ),
            AppError::ResourceNotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{} no encontrado.", what))
            }
            AppError::BusinessRule(msg) => (StatusCode::BAD_REQUEST, msg),

            // Todo lo demás (DatabaseError, InternalServerError, etc.) es un 500.
            // `tracing` registra el detalle; el cliente recibe un mensaje genérico.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocurrió un error inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cada_variante_mapea_al_status_esperado() {
        let cases = vec![
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::AccountDisabled, StatusCode::UNAUTHORIZED),
            (
                AppError::AccessDenied("broker:clients:read".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::ResourceNotFound("Cliente".into()),
                StatusCode::NOT_FOUND,
            ),
            (AppError::EmailAlreadyExists, StatusCode::CONFLICT),
            (
                AppError::DuplicateResource("Invitación pendiente".into()),
                StatusCode::CONFLICT,
            ),
            (
                AppError::BusinessRule("propiedad no pertenece al propietario".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::InternalServerError(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn errores_de_validacion_devuelven_400() {
        let mut errors = validator::ValidationErrors::new();
        let mut field_err = validator::ValidationError::new("email");
        field_err.message = Some("inválido".into());
        errors.add("email", field_err);

        let resp = AppError::ValidationError(errors).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
