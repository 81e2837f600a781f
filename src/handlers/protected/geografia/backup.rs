use crate::handlers::extract::ApiJson;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::{GeoSnapshot, GeografiaBackupService, RestoreReport};

/// GET /api/geografia/backup - Snapshot of the four geography tables
pub async fn get(_admin: AdminUser) -> ApiResult<GeoSnapshot> {
    let snapshot = GeografiaBackupService::new()?.backup().await?;
    Ok(ApiResponse::success(snapshot))
}

/// POST /api/geografia/restore - Body is a snapshot as produced by the backup endpoint
pub async fn restore(AdminUser(admin): AdminUser, ApiJson(snapshot): ApiJson<GeoSnapshot>) -> ApiResult<RestoreReport> {
    tracing::warn!(by = %admin.email, comunas = snapshot.comunas.len(), "Geography restore requested");
    let report = GeografiaBackupService::new()?.restore(&snapshot).await?;
    Ok(ApiResponse::success(report))
}
