// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Mapea el CREATE TYPE user_role de la base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Owner,
    Tenant,
    Broker,
    Provider,
    Maintenance,
    Runner,
    Admin,
    Support,
}

// Representa un usuario leído de la base de datos
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para seguridad
    pub password_hash: String,

    pub phone: Option<String>,
    pub rut: Option<String>,
    pub rut_verified: bool,
    pub role: UserRole,
    pub is_active: bool,
    pub email_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ADMIN y SUPPORT se crean por otro canal, nunca por registro público
fn validate_self_service_role(role: &UserRole) -> Result<(), ValidationError> {
    match role {
        UserRole::Admin | UserRole::Support => {
            let mut err = ValidationError::new("forbidden_role");
            err.message = Some("Este rol no puede auto-registrarse.".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

// Datos para registro de un nuevo usuario
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres."))]
    #[schema(example = "Carolina Pérez")]
    pub name: String,

    #[validate(email(message = "El e-mail entregado es inválido."))]
    #[schema(example = "carolina@rent360.cl")]
    pub email: String,

    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,

    #[validate(custom(function = validate_self_service_role))]
    #[schema(example = "OWNER")]
    pub role: UserRole,

    pub phone: Option<String>,

    #[schema(example = "12.345.678-9")]
    pub rut: Option<String>,
}

// Datos para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "El e-mail entregado es inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
}

// Respuesta de autenticación con el token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estructura de datos ("claims") dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // ID del usuario
    pub role: UserRole, // Rol al momento de emitir el token
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registro_rechaza_roles_administrativos() {
        let payload = RegisterUserPayload {
            name: "Intruso".into(),
            email: "intruso@rent360.cl".into(),
            password: "secreta1".into(),
            role: UserRole::Admin,
            phone: None,
            rut: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn registro_acepta_roles_de_autoservicio() {
        let payload = RegisterUserPayload {
            name: "Carolina Pérez".into(),
            email: "carolina@rent360.cl".into(),
            password: "secreta1".into(),
            role: UserRole::Broker,
            phone: None,
            rut: None,
        };
        assert!(payload.validate().is_ok());
    }
}
