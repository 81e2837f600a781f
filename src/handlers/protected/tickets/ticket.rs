use serde_json::{json, Value};

use crate::api::tickets::{CreateTicket, TicketFilter, UpdateTicket};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::{TicketDetalle, TicketResumen};
use crate::database::tickets::{delete_ticket, list_tickets, ticket_detalle};
use crate::handlers::extract::{ApiPath, ApiQuery};
use crate::middleware::{AdminUser, ApiResponse, ApiResult, Pagina, SessionUser};
use crate::services::TicketService;
use crate::validation::ValidJson;

/// GET /api/tickets - Filtered, paginated listing, newest first
pub async fn list(ApiQuery(filter): ApiQuery<TicketFilter>) -> ApiResult<Pagina<TicketResumen>> {
    let limit = config::config().page_limit(filter.limit);
    let pool = DatabaseManager::pool()?;
    let (items, total) = list_tickets(&pool, &filter, limit).await?;

    Ok(ApiResponse::page(items, total, filter.page(), limit))
}

/// POST /api/tickets - Create a ticket with its optional initial action
pub async fn create(user: SessionUser, ValidJson(input): ValidJson<CreateTicket>) -> ApiResult<TicketDetalle> {
    let ticket = TicketService::new()?.create(&input, &user).await?;
    Ok(ApiResponse::created(ticket))
}

/// GET /api/tickets/:id
pub async fn get(ApiPath(id): ApiPath<i32>) -> ApiResult<TicketDetalle> {
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(ticket_detalle(&pool, id).await?))
}

/// PUT /api/tickets/:id
pub async fn update(
    user: SessionUser,
    ApiPath(id): ApiPath<i32>,
    ValidJson(input): ValidJson<UpdateTicket>,
) -> ApiResult<TicketDetalle> {
    let ticket = TicketService::new()?.update(id, &input, &user).await?;
    Ok(ApiResponse::success(ticket))
}

/// DELETE /api/tickets/:id - Physical delete; actions cascade
pub async fn delete(AdminUser(admin): AdminUser, ApiPath(id): ApiPath<i32>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool()?;
    delete_ticket(&pool, id).await?;
    tracing::info!(ticket_id = id, by = %admin.email, "Ticket deleted");
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
