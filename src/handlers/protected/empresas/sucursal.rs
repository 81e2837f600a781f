use crate::api::empresas::{CreateSucursal, Inactivas, UpdateSucursal};
use crate::database::empresas::{
    deactivate_sucursal, get_empresa, get_sucursal, insert_sucursal, list_sucursales, update_sucursal,
};
use crate::database::manager::DatabaseManager;
use crate::database::models::Sucursal;
use crate::handlers::extract::{ApiPath, ApiQuery};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::validation::ValidJson;

/// GET /api/empresas/:id/sucursales
pub async fn list(
    ApiPath(empresa_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<Inactivas>,
) -> ApiResult<Vec<Sucursal>> {
    let pool = DatabaseManager::pool()?;
    get_empresa(&pool, empresa_id).await?;
    let sucursales = list_sucursales(&pool, empresa_id, query.incluir_inactivas).await?;
    Ok(ApiResponse::success(sucursales))
}

/// POST /api/empresas/:id/sucursales
pub async fn create(
    _admin: AdminUser,
    ApiPath(empresa_id): ApiPath<i32>,
    ValidJson(input): ValidJson<CreateSucursal>,
) -> ApiResult<Sucursal> {
    let pool = DatabaseManager::pool()?;
    get_empresa(&pool, empresa_id).await?;
    Ok(ApiResponse::created(insert_sucursal(&pool, empresa_id, &input).await?))
}

pub async fn get(ApiPath(id): ApiPath<i32>) -> ApiResult<Sucursal> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(get_sucursal(&pool, id).await?))
}

pub async fn update(
    _admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
    ValidJson(input): ValidJson<UpdateSucursal>,
) -> ApiResult<Sucursal> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(update_sucursal(&pool, id, &input).await?))
}

pub async fn delete(_admin: AdminUser, ApiPath(id): ApiPath<i32>) -> ApiResult<Sucursal> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(deactivate_sucursal(&pool, id).await?))
}
