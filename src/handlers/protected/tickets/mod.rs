// handlers/protected/tickets/mod.rs - Tickets and their action log
//
// /api/tickets                         GET list, POST create
// /api/tickets/:id                     GET, PUT, DELETE (ADMIN)
// /api/tickets/:id/accion              GET list, POST append
// /api/tickets/:id/accion/:accionId    PUT, DELETE (author or ADMIN)

pub mod accion;
pub mod ticket;

pub use accion::{create as accion_create, delete as accion_delete, list as accion_list, update as accion_update};
pub use ticket::{create as ticket_create, delete as ticket_delete, get as ticket_get, list as ticket_list, update as ticket_update};
