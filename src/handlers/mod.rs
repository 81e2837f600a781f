// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no session) → Protected (session cookie or bearer token).
// ADMIN-only operations live beside their resource and take the `AdminUser`
// extractor, since most paths mix session reads with admin writes.

pub mod extract;
pub mod protected;
pub mod public;
