pub mod empresa;
pub mod geografia;
pub mod ticket;
pub mod usuario;

pub use empresa::*;
pub use geografia::*;
pub use ticket::*;
pub use usuario::*;
