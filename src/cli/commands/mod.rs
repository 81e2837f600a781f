pub mod geografia;
pub mod importar;
pub mod migrate;
pub mod usuario;
