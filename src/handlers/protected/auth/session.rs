use crate::middleware::{ApiResponse, ApiResult, SessionUser};

/// GET /api/auth/session - The caller's session
pub async fn get(user: SessionUser) -> ApiResult<SessionUser> {
    Ok(ApiResponse::success(user))
}
