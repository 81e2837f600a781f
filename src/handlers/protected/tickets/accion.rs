use serde_json::{json, Value};

use crate::api::tickets::{CreateAccion, UpdateAccion};
use crate::database::acciones::list_acciones;
use crate::database::manager::DatabaseManager;
use crate::database::models::AccionTicket;
use crate::database::tickets::get_ticket;
use crate::handlers::extract::ApiPath;
use crate::middleware::{ApiResponse, ApiResult, SessionUser};
use crate::services::TicketService;
use crate::validation::ValidJson;

/// GET /api/tickets/:id/accion - Oldest first
pub async fn list(ApiPath(ticket_id): ApiPath<i32>) -> ApiResult<Vec<AccionTicket>> {
    let pool = DatabaseManager::pool()?;
    get_ticket(&pool, ticket_id).await?;
    Ok(ApiResponse::success(list_acciones(&pool, ticket_id).await?))
}

/// POST /api/tickets/:id/accion
pub async fn create(
    user: SessionUser,
    ApiPath(ticket_id): ApiPath<i32>,
    ValidJson(input): ValidJson<CreateAccion>,
) -> ApiResult<AccionTicket> {
    let accion = TicketService::new()?.create_accion(ticket_id, &input, &user).await?;
    Ok(ApiResponse::created(accion))
}

/// PUT /api/tickets/:id/accion/:accionId
pub async fn update(
    user: SessionUser,
    ApiPath((ticket_id, accion_id)): ApiPath<(i32, i32)>,
    ValidJson(input): ValidJson<UpdateAccion>,
) -> ApiResult<AccionTicket> {
    let accion = TicketService::new()?
        .update_accion(ticket_id, accion_id, &input, &user)
        .await?;
    Ok(ApiResponse::success(accion))
}

/// DELETE /api/tickets/:id/accion/:accionId
pub async fn delete(user: SessionUser, ApiPath((ticket_id, accion_id)): ApiPath<(i32, i32)>) -> ApiResult<Value> {
    TicketService::new()?.delete_accion(ticket_id, accion_id, &user).await?;
    Ok(ApiResponse::success(json!({ "id": accion_id, "deleted": true })))
}
