use crate::api::empresas::{CreateEmpresa, EmpresaFilter, UpdateEmpresa};
use crate::api::tickets::like_pattern;
use crate::database::empresas::{deactivate_empresa, empresa_detalle, insert_empresa, list_empresas, update_empresa};
use crate::database::manager::DatabaseManager;
use crate::database::models::{Empresa, EmpresaDetalle};
use crate::handlers::extract::{ApiPath, ApiQuery};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::validation::ValidJson;

/// GET /api/empresas?incluirInactivas&q
pub async fn list(ApiQuery(filter): ApiQuery<EmpresaFilter>) -> ApiResult<Vec<Empresa>> {
    let pattern = filter
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(like_pattern);
    let pool = DatabaseManager::pool()?;
    let empresas = list_empresas(&pool, filter.incluir_inactivas, pattern).await?;
    Ok(ApiResponse::success(empresas))
}

/// GET /api/empresas/:id - With address, sucursales and contactos
pub async fn get(ApiPath(id): ApiPath<i32>) -> ApiResult<EmpresaDetalle> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(empresa_detalle(&pool, id).await?))
}

pub async fn create(_admin: AdminUser, ValidJson(input): ValidJson<CreateEmpresa>) -> ApiResult<Empresa> {
    let pool = DatabaseManager::pool()?;
    let empresa = insert_empresa(&pool, &input).await?;
    tracing::info!(empresa_id = empresa.id, rut = %empresa.rut, "Empresa created");
    Ok(ApiResponse::created(empresa))
}

pub async fn update(
    _admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
    ValidJson(input): ValidJson<UpdateEmpresa>,
) -> ApiResult<Empresa> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(update_empresa(&pool, id, &input).await?))
}

/// DELETE /api/empresas/:id - Soft delete
pub async fn delete(_admin: AdminUser, ApiPath(id): ApiPath<i32>) -> ApiResult<Empresa> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(deactivate_empresa(&pool, id).await?))
}
