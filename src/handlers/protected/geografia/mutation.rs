use serde_json::{json, Value};

use crate::api::geografia::{GeoInput, Nivel};
use crate::database::geografia::{delete as delete_row, insert, update as update_row, GeoRecord};
use crate::database::manager::DatabaseManager;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

/// POST /api/geografia/{nivel}
pub async fn create(nivel: Nivel, _admin: AdminUser, ApiJson(input): ApiJson<GeoInput>) -> ApiResult<GeoRecord> {
    input.validate_create(nivel)?;
    let nombre = input.nombre().unwrap_or_default();

    let pool = DatabaseManager::pool()?;
    let record = insert(&pool, nivel, nombre, input.parent_id(nivel)).await?;
    Ok(ApiResponse::created(record))
}

/// PUT /api/geografia/{nivel}/:id
pub async fn update(
    nivel: Nivel,
    _admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<GeoInput>,
) -> ApiResult<GeoRecord> {
    input.validate_update(nivel)?;

    let pool = DatabaseManager::pool()?;
    let record = update_row(&pool, nivel, id, input.nombre(), input.parent_id(nivel)).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/geografia/{nivel}/:id - 409 while children still reference the row
pub async fn delete(nivel: Nivel, _admin: AdminUser, ApiPath(id): ApiPath<i32>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool()?;
    delete_row(&pool, nivel, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
