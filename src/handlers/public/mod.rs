// handlers/public/mod.rs - Handlers reachable without a session
//
// The OAuth sign-in round trip and sign-out.

pub mod auth;

pub use auth::*;
