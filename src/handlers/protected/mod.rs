// handlers/protected/mod.rs - Handlers behind the session middleware
//
// Every route here sees a validated `SessionUser` in the request extensions.
// Writes on empresas, geography and usuarios additionally require ADMIN.

pub mod auth;
pub mod empresas;
pub mod geografia;
pub mod tickets;
pub mod usuarios;
