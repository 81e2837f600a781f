use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::empresa::{ContactoEmpresa, EmpresaResumen, Sucursal, Ubicacion};
use super::usuario::UsuarioResumen;
use crate::types::{EstadoTicket, PrioridadTicket, TipoAccion};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i32,
    pub numero_caso: String,
    pub titulo: String,
    pub descripcion: String,
    pub estado: EstadoTicket,
    pub prioridad: PrioridadTicket,
    pub empresa_id: i32,
    pub sucursal_id: Option<i32>,
    pub ubicacion_id: Option<i32>,
    pub contacto_id: Option<i32>,
    pub tecnico_id: Option<Uuid>,
    pub creado_por_id: Uuid,
    pub fecha_cierre: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for ticket listings
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TicketResumen {
    pub id: i32,
    pub numero_caso: String,
    pub titulo: String,
    pub estado: EstadoTicket,
    pub prioridad: PrioridadTicket,
    pub empresa_id: i32,
    pub empresa_nombre: String,
    pub tecnico_id: Option<Uuid>,
    pub tecnico_nombre: Option<String>,
    pub fecha_cierre: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Action log entry joined with its author's name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccionTicket {
    pub id: i32,
    pub ticket_id: i32,
    pub usuario_id: Uuid,
    pub usuario_nombre: String,
    pub descripcion: String,
    pub tipo: TipoAccion,
    pub fecha: DateTime<Utc>,
}

/// Ticket with every relation the detail view displays
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetalle {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub empresa: EmpresaResumen,
    pub sucursal: Option<Sucursal>,
    pub ubicacion: Option<Ubicacion>,
    pub contacto: Option<ContactoEmpresa>,
    pub tecnico: Option<UsuarioResumen>,
    pub creado_por: UsuarioResumen,
    pub acciones: Vec<AccionTicket>,
}

