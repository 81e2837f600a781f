use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pais {
    pub id: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: i32,
    pub nombre: String,
    pub pais_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Provincia {
    pub id: i32,
    pub nombre: String,
    pub region_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comuna {
    pub id: i32,
    pub nombre: String,
    pub provincia_id: i32,
}

/// Comuna with its provincia/region/pais names, used by search and address display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ComunaJerarquia {
    pub id: i32,
    pub nombre: String,
    pub provincia_id: i32,
    pub provincia: String,
    pub region_id: i32,
    pub region: String,
    pub pais_id: i32,
    pub pais: String,
}
