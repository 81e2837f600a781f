// handlers/protected/empresas/mod.rs - Client companies and their children
//
// Reads need a session; every write needs ADMIN. DELETE deactivates.

pub mod contacto;
pub mod direccion;
pub mod empresa;
pub mod importar;
pub mod sucursal;
pub mod ubicacion;
