use crate::api::empresas::{CreateContacto, Inactivas, UpdateContacto};
use crate::database::empresas::{
    deactivate_contacto, get_contacto, get_empresa, insert_contacto, list_contactos, update_contacto,
};
use crate::database::manager::DatabaseManager;
use crate::database::models::ContactoEmpresa;
use crate::handlers::extract::{ApiPath, ApiQuery};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::validation::ValidJson;

/// GET /api/empresas/:id/contactos
pub async fn list(
    ApiPath(empresa_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<Inactivas>,
) -> ApiResult<Vec<ContactoEmpresa>> {
    let pool = DatabaseManager::pool()?;
    get_empresa(&pool, empresa_id).await?;
    let contactos = list_contactos(&pool, empresa_id, query.incluir_inactivas).await?;
    Ok(ApiResponse::success(contactos))
}

/// POST /api/empresas/:id/contactos
pub async fn create(
    _admin: AdminUser,
    ApiPath(empresa_id): ApiPath<i32>,
    ValidJson(input): ValidJson<CreateContacto>,
) -> ApiResult<ContactoEmpresa> {
    let pool = DatabaseManager::pool()?;
    get_empresa(&pool, empresa_id).await?;
    Ok(ApiResponse::created(insert_contacto(&pool, empresa_id, &input).await?))
}

pub async fn get(ApiPath(id): ApiPath<i32>) -> ApiResult<ContactoEmpresa> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(get_contacto(&pool, id).await?))
}

pub async fn update(
    _admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
    ValidJson(input): ValidJson<UpdateContacto>,
) -> ApiResult<ContactoEmpresa> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(update_contacto(&pool, id, &input).await?))
}

pub async fn delete(_admin: AdminUser, ApiPath(id): ApiPath<i32>) -> ApiResult<ContactoEmpresa> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(deactivate_contacto(&pool, id).await?))
}
