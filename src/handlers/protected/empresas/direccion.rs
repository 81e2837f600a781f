use crate::api::empresas::{CreateDireccion, UpdateDireccion};
use crate::database::empresas::{direccion_detalle, insert_direccion, update_direccion};
use crate::database::manager::DatabaseManager;
use crate::database::models::DireccionDetalle;
use crate::handlers::extract::ApiPath;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::validation::ValidJson;

/// POST /api/direcciones - Returned with its comuna/provincia/region chain
pub async fn create(_admin: AdminUser, ValidJson(input): ValidJson<CreateDireccion>) -> ApiResult<DireccionDetalle> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::created(insert_direccion(&pool, &input).await?))
}

pub async fn get(ApiPath(id): ApiPath<i32>) -> ApiResult<DireccionDetalle> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(direccion_detalle(&pool, id).await?))
}

pub async fn update(
    _admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
    ValidJson(input): ValidJson<UpdateDireccion>,
) -> ApiResult<DireccionDetalle> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(update_direccion(&pool, id, &input).await?))
}
