use uuid::Uuid;

use crate::api::usuarios::{CreateUsuario, UpdateUsuario};
use crate::database::manager::DatabaseManager;
use crate::database::models::Usuario;
use crate::database::usuarios::{insert_usuario, list_activos, update_usuario};
use crate::handlers::extract::ApiPath;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::validation::ValidJson;

/// GET /api/usuarios - Active users, for assignee pickers
pub async fn list() -> ApiResult<Vec<Usuario>> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(list_activos(&pool).await?))
}

/// POST /api/usuarios - Provision a user allowed to sign in
pub async fn create(AdminUser(admin): AdminUser, ValidJson(input): ValidJson<CreateUsuario>) -> ApiResult<Usuario> {
    let pool = DatabaseManager::pool()?;
    let usuario = insert_usuario(&pool, &input).await?;
    tracing::info!(user_id = %usuario.id, email = %usuario.email, by = %admin.email, "Usuario provisioned");
    Ok(ApiResponse::created(usuario))
}

/// PUT /api/usuarios/:id - Rename, change role or (de)activate
pub async fn update(
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateUsuario>,
) -> ApiResult<Usuario> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(update_usuario(&pool, id, &input).await?))
}
