pub mod acciones;
pub mod empresas;
pub mod geografia;
pub mod manager;
pub mod models;
pub mod tickets;
pub mod usuarios;

pub use manager::{DatabaseError, DatabaseManager};
