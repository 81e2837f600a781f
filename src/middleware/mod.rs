pub mod auth;
pub mod response;

pub use auth::{session_auth_middleware, AdminUser, SessionUser};
pub use response::{ApiResponse, ApiResult, Pagina};
