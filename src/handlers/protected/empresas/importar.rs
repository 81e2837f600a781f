use crate::api::empresas::ImportEmpresas;
use crate::handlers::extract::ApiJson;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::{EmpresaImportService, ImportSummary};

/// POST /api/empresas/importar - Insert pre-parsed CSV rows one by one
pub async fn post(AdminUser(admin): AdminUser, ApiJson(body): ApiJson<ImportEmpresas>) -> ApiResult<ImportSummary> {
    tracing::info!(rows = body.rows.len(), by = %admin.email, "Empresa import requested");
    let summary = EmpresaImportService::new()?.import(body.rows).await?;
    Ok(ApiResponse::success(summary))
}
