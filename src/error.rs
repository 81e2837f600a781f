// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::oauth::OAuthError;
use crate::auth::JwtError;
use crate::database::manager::DatabaseError;
use crate::services::{SnapshotError, TicketError};
use crate::validation::ValidationErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<BTreeMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (identity provider issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<BTreeMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// User-facing message for a unique constraint, keyed by constraint name
fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("tickets_numero_caso_key") => "Ya existe un ticket con ese número de caso".to_string(),
        Some("empresas_rut_key") => "Ya existe una empresa con ese RUT".to_string(),
        Some("usuarios_email_key") => "Ya existe un usuario con ese email".to_string(),
        Some(c) if c.contains("nombre") => "Ya existe un registro con ese nombre".to_string(),
        _ => "El registro ya existe".to_string(),
    }
}

const RELATED_ENTITIES: &[(&str, &str)] = &[
    ("creado_por_id", "El usuario indicado"),
    ("usuario_id", "El usuario indicado"),
    ("tecnico_id", "El técnico indicado"),
    ("empresa_id", "La empresa indicada"),
    ("sucursal_id", "La sucursal indicada"),
    ("ubicacion_id", "La ubicación indicada"),
    ("contacto_id", "El contacto indicado"),
    ("direccion_id", "La dirección indicada"),
    ("comuna_id", "La comuna indicada"),
    ("provincia_id", "La provincia indicada"),
    ("region_id", "La región indicada"),
    ("pais_id", "El país indicado"),
    ("ticket_id", "El ticket indicado"),
];

/// Map a `{table}_{column}_fkey` constraint to the entity it points at
fn related_entity(constraint: Option<&str>) -> Option<&'static str> {
    let constraint = constraint?.strip_suffix("_fkey")?;
    RELATED_ENTITIES
        .iter()
        .find(|(column, _)| constraint.ends_with(column))
        .map(|(_, label)| *label)
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_connection_error() {
            tracing::error!("Database unavailable: {}", err);
            return ApiError::service_unavailable("Base de datos no disponible temporalmente");
        }

        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::UniqueViolation { constraint } => {
                ApiError::conflict(unique_violation_message(constraint.as_deref()))
            }
            DatabaseError::ForeignKeyViolation { constraint, still_referenced: true } => {
                tracing::debug!("Delete blocked by {:?}", constraint);
                ApiError::conflict("No se puede eliminar: existen registros que dependen de este")
            }
            DatabaseError::ForeignKeyViolation { constraint, still_referenced: false } => {
                match related_entity(constraint.as_deref()) {
                    Some(entity) => ApiError::bad_request(format!("{} no existe", entity)),
                    None => ApiError::bad_request("El registro relacionado no existe"),
                }
            }
            DatabaseError::NotNullViolation(msg) => {
                tracing::warn!("Not-null violation: {}", msg);
                ApiError::bad_request("Faltan campos obligatorios")
            }
            DatabaseError::Migrate(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("El servicio se está actualizando, intente más tarde")
            }
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Missing configuration: {}", name);
                ApiError::service_unavailable("Base de datos no disponible temporalmente")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Error interno al procesar la solicitud")
            }
        }
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::Database(e) => e.into(),
            TicketError::Forbidden(msg) => ApiError::forbidden(msg),
        }
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Database(e) => e.into(),
            SnapshotError::Serialization(e) => {
                tracing::error!("Snapshot serialization failed: {}", e);
                ApiError::internal_server_error("No se pudo serializar el respaldo")
            }
            other => ApiError::bad_request(format!("Respaldo inválido: {}", other)),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::NotConfigured(name) => {
                tracing::error!("OAuth provider not configured: {}", name);
                ApiError::service_unavailable("Inicio de sesión no disponible")
            }
            other => {
                tracing::warn!("OAuth login failed: {}", other);
                ApiError::bad_gateway("No se pudo validar la identidad con el proveedor")
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        tracing::error!("Session token error: {}", err);
        ApiError::internal_server_error("No se pudo emitir la sesión")
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation_error("Datos inválidos", Some(errors.into_inner()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_case_number_maps_to_conflict() {
        let err: ApiError = DatabaseError::UniqueViolation {
            constraint: Some("tickets_numero_caso_key".to_string()),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.message().contains("número de caso"));
    }

    #[test]
    fn missing_parent_maps_to_bad_request_naming_entity() {
        let err: ApiError = DatabaseError::ForeignKeyViolation {
            constraint: Some("tickets_empresa_id_fkey".to_string()),
            still_referenced: false,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "La empresa indicada no existe");
    }

    #[test]
    fn creator_fkey_is_not_confused_with_other_columns() {
        assert_eq!(related_entity(Some("tickets_creado_por_id_fkey")), Some("El usuario indicado"));
        assert_eq!(related_entity(Some("comunas_provincia_id_fkey")), Some("La provincia indicada"));
        assert_eq!(related_entity(Some("something_else")), None);
    }

    #[test]
    fn blocked_delete_maps_to_conflict() {
        let err: ApiError = DatabaseError::ForeignKeyViolation {
            constraint: Some("regiones_pais_id_fkey".to_string()),
            still_referenced: true,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_configuration_is_unavailable() {
        let err: ApiError = DatabaseError::ConfigMissing("DATABASE_URL").into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validation_errors_render_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("titulo", "es obligatorio");
        let json = ApiError::from(errors).to_json();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["field_errors"]["titulo"], "es obligatorio");
    }

    #[test]
    fn action_permission_failure_is_forbidden() {
        let err: ApiError = TicketError::Forbidden("solo el autor".into()).into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let err: ApiError = TicketError::Database(DatabaseError::not_found("Ticket", 9)).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Ticket 9 no existe");
    }

    #[test]
    fn corrupt_snapshot_is_bad_request() {
        let err: ApiError = SnapshotError::ChecksumMismatch {
            expected: "a".into(),
            computed: "b".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("Respaldo inválido"));
    }
}
