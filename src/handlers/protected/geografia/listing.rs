use crate::api::geografia::{BuscarQuery, GeoFilter, Nivel};
use crate::api::tickets::like_pattern;
use crate::database::geografia::{
    buscar_comunas, list_comunas, list_paises, list_provincias, list_regiones, GeoRecord,
};
use crate::database::manager::DatabaseManager;
use crate::database::models::ComunaJerarquia;
use crate::error::ApiError;
use crate::handlers::extract::ApiQuery;
use crate::middleware::{ApiResponse, ApiResult};

const MAX_RESULTADOS_BUSQUEDA: i64 = 50;

/// GET /api/geografia/{paises|regiones|provincias|comunas}, filtered by the parent id
pub async fn list(nivel: Nivel, ApiQuery(filter): ApiQuery<GeoFilter>) -> ApiResult<Vec<GeoRecord>> {
    let pool = DatabaseManager::pool()?;
    let parent = filter.parent_id(nivel);

    let records = match nivel {
        Nivel::Pais => list_paises(&pool).await?.into_iter().map(GeoRecord::Pais).collect(),
        Nivel::Region => list_regiones(&pool, parent).await?.into_iter().map(GeoRecord::Region).collect(),
        Nivel::Provincia => list_provincias(&pool, parent)
            .await?
            .into_iter()
            .map(GeoRecord::Provincia)
            .collect(),
        Nivel::Comuna => list_comunas(&pool, parent).await?.into_iter().map(GeoRecord::Comuna).collect(),
    };
    Ok(ApiResponse::success(records))
}

/// GET /api/geografia/buscar?q= - Up to 50 comunas by name, with provincia and region
pub async fn buscar(ApiQuery(query): ApiQuery<BuscarQuery>) -> ApiResult<Vec<ComunaJerarquia>> {
    let term = query
        .term()
        .ok_or_else(|| ApiError::bad_request("El parámetro q es obligatorio"))?;

    let pool = DatabaseManager::pool()?;
    let comunas = buscar_comunas(&pool, &like_pattern(term), MAX_RESULTADOS_BUSQUEDA).await?;
    Ok(ApiResponse::success(comunas))
}
