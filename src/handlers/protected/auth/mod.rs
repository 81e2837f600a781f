pub mod session;

pub use session::get as session_get;
