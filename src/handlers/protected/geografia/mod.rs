// handlers/protected/geografia/mod.rs - Pais > Region > Provincia > Comuna
//
// Listing and search need a session. Mutations, backup and restore need ADMIN.
// Per-level handlers take the `Nivel` bound at route registration.

pub mod backup;
pub mod listing;
pub mod mutation;
