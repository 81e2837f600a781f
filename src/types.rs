/// Shared enumerations backed by Postgres enum types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role claim carried in the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rol_usuario", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rol {
    Admin,
    Tecnico,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "estado_ticket", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoTicket {
    Abierto,
    EnProceso,
    Pendiente,
    Resuelto,
    Cerrado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "prioridad_ticket", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrioridadTicket {
    Baja,
    Media,
    Alta,
    Urgente,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tipo_accion", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAccion {
    Nota,
    Visita,
    Remota,
    Llamada,
    CambioEstado,
}

impl Rol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Admin => "ADMIN",
            Rol::Tecnico => "TECNICO",
        }
    }
}

impl EstadoTicket {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoTicket::Abierto => "ABIERTO",
            EstadoTicket::EnProceso => "EN_PROCESO",
            EstadoTicket::Pendiente => "PENDIENTE",
            EstadoTicket::Resuelto => "RESUELTO",
            EstadoTicket::Cerrado => "CERRADO",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, EstadoTicket::Cerrado)
    }
}

impl fmt::Display for Rol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EstadoTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Rol::Admin),
            "TECNICO" => Ok(Rol::Tecnico),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_screaming_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_value(EstadoTicket::EnProceso).unwrap(), "EN_PROCESO");
        assert_eq!(serde_json::to_value(TipoAccion::CambioEstado).unwrap(), "CAMBIO_ESTADO");
        let p: PrioridadTicket = serde_json::from_str("\"URGENTE\"").unwrap();
        assert_eq!(p, PrioridadTicket::Urgente);
        assert!(serde_json::from_str::<EstadoTicket>("\"abierto\"").is_err());
    }

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!("admin".parse::<Rol>().unwrap(), Rol::Admin);
        assert_eq!(" TECNICO ".parse::<Rol>().unwrap(), Rol::Tecnico);
        assert!("root".parse::<Rol>().is_err());
    }
}
