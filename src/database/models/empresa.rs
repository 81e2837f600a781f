use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::geografia::ComunaJerarquia;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Direccion {
    pub id: i32,
    pub calle: String,
    pub numero: String,
    pub departamento: Option<String>,
    pub referencia: Option<String>,
    pub comuna_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DireccionDetalle {
    #[serde(flatten)]
    pub direccion: Direccion,
    pub comuna: ComunaJerarquia,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: i32,
    pub nombre: String,
    pub rut: String,
    pub giro: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    pub direccion_id: Option<i32>,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaResumen {
    pub id: i32,
    pub nombre: String,
    pub rut: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaDetalle {
    #[serde(flatten)]
    pub empresa: Empresa,
    pub direccion: Option<DireccionDetalle>,
    pub sucursales: Vec<Sucursal>,
    pub contactos: Vec<ContactoEmpresa>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sucursal {
    pub id: i32,
    pub empresa_id: i32,
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion_id: Option<i32>,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ubicacion {
    pub id: i32,
    pub sucursal_id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactoEmpresa {
    pub id: i32,
    pub empresa_id: i32,
    pub nombre: String,
    pub cargo: Option<String>,
    pub correo: Option<String>,
    pub telefono: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
