use crate::api::empresas::{CreateUbicacion, UbicacionFilter, UpdateUbicacion};
use crate::database::empresas::{deactivate_ubicacion, get_ubicacion, insert_ubicacion, list_ubicaciones, update_ubicacion};
use crate::database::manager::DatabaseManager;
use crate::database::models::Ubicacion;
use crate::handlers::extract::{ApiPath, ApiQuery};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::validation::ValidJson;

/// GET /api/ubicaciones?sucursalId
pub async fn list(ApiQuery(filter): ApiQuery<UbicacionFilter>) -> ApiResult<Vec<Ubicacion>> {
    let pool = DatabaseManager::pool()?;
    let ubicaciones = list_ubicaciones(&pool, filter.sucursal_id, filter.incluir_inactivas).await?;
    Ok(ApiResponse::success(ubicaciones))
}

pub async fn create(_admin: AdminUser, ValidJson(input): ValidJson<CreateUbicacion>) -> ApiResult<Ubicacion> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::created(insert_ubicacion(&pool, &input).await?))
}

pub async fn get(ApiPath(id): ApiPath<i32>) -> ApiResult<Ubicacion> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(get_ubicacion(&pool, id).await?))
}

pub async fn update(
    _admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
    ValidJson(input): ValidJson<UpdateUbicacion>,
) -> ApiResult<Ubicacion> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(update_ubicacion(&pool, id, &input).await?))
}

pub async fn delete(_admin: AdminUser, ApiPath(id): ApiPath<i32>) -> ApiResult<Ubicacion> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(deactivate_ubicacion(&pool, id).await?))
}
