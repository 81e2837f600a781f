use serde::Deserialize;

use super::double_option;
use crate::validation::{validate_rut, Validate, ValidationErrors};

const MAX_NOMBRE: usize = 200;
const MAX_CORTO: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmpresa {
    pub nombre: String,
    pub rut: String,
    pub giro: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    pub direccion_id: Option<i32>,
}

impl Validate for CreateEmpresa {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("nombre", &self.nombre);
        errors.max_len("nombre", &self.nombre, MAX_NOMBRE);
        errors.required("rut", &self.rut);
        if !self.rut.trim().is_empty() && !validate_rut(&self.rut) {
            errors.add("rut", "RUT inválido");
        }
        errors.optional_max_len("giro", self.giro.as_deref(), MAX_NOMBRE);
        errors.optional_max_len("telefono", self.telefono.as_deref(), MAX_CORTO);
        errors.optional_email("correo", self.correo.as_deref());
        errors.optional_positive_id("direccionId", self.direccion_id);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmpresa {
    pub nombre: Option<String>,
    pub rut: Option<String>,
    pub giro: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub direccion_id: Option<Option<i32>>,
    pub activa: Option<bool>,
}

impl Validate for UpdateEmpresa {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("nombre", self.nombre.as_deref());
        errors.optional_max_len("nombre", self.nombre.as_deref(), MAX_NOMBRE);
        if let Some(rut) = self.rut.as_deref() {
            if !validate_rut(rut) {
                errors.add("rut", "RUT inválido");
            }
        }
        errors.optional_max_len("giro", self.giro.as_deref(), MAX_NOMBRE);
        errors.optional_max_len("telefono", self.telefono.as_deref(), MAX_CORTO);
        errors.optional_email("correo", self.correo.as_deref());
        errors.optional_positive_id("direccionId", self.direccion_id.flatten());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaFilter {
    #[serde(default)]
    pub incluir_inactivas: bool,
    pub q: Option<String>,
}

/// `?incluirInactivas=true` on child listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inactivas {
    #[serde(default)]
    pub incluir_inactivas: bool,
}

/// Body of the bulk import endpoint: rows already parsed from CSV on the client
#[derive(Debug, Clone, Deserialize)]
pub struct ImportEmpresas {
    pub rows: Vec<serde_json::Value>,
}

/// One CSV row; every column arrives as text
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEmpresaRow {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub rut: String,
    pub giro: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
}

impl From<ImportEmpresaRow> for CreateEmpresa {
    fn from(row: ImportEmpresaRow) -> Self {
        CreateEmpresa {
            nombre: row.nombre.trim().to_string(),
            rut: row.rut.trim().to_string(),
            giro: super::clean(&row.giro),
            telefono: super::clean(&row.telefono),
            correo: super::clean(&row.correo),
            direccion_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSucursal {
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion_id: Option<i32>,
}

impl Validate for CreateSucursal {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("nombre", &self.nombre);
        errors.max_len("nombre", &self.nombre, MAX_NOMBRE);
        errors.optional_max_len("telefono", self.telefono.as_deref(), MAX_CORTO);
        errors.optional_positive_id("direccionId", self.direccion_id);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSucursal {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub direccion_id: Option<Option<i32>>,
    pub activa: Option<bool>,
}

impl Validate for UpdateSucursal {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("nombre", self.nombre.as_deref());
        errors.optional_max_len("nombre", self.nombre.as_deref(), MAX_NOMBRE);
        errors.optional_max_len("telefono", self.telefono.as_deref(), MAX_CORTO);
        errors.optional_positive_id("direccionId", self.direccion_id.flatten());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUbicacion {
    pub sucursal_id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
}

impl Validate for CreateUbicacion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.positive_id("sucursalId", self.sucursal_id);
        errors.required("nombre", &self.nombre);
        errors.max_len("nombre", &self.nombre, MAX_NOMBRE);
        errors.optional_max_len("descripcion", self.descripcion.as_deref(), 1000);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUbicacion {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub activa: Option<bool>,
}

impl Validate for UpdateUbicacion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("nombre", self.nombre.as_deref());
        errors.optional_max_len("nombre", self.nombre.as_deref(), MAX_NOMBRE);
        errors.optional_max_len("descripcion", self.descripcion.as_deref(), 1000);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UbicacionFilter {
    pub sucursal_id: Option<i32>,
    #[serde(default)]
    pub incluir_inactivas: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContacto {
    pub nombre: String,
    pub cargo: Option<String>,
    pub correo: Option<String>,
    pub telefono: Option<String>,
}

impl Validate for CreateContacto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("nombre", &self.nombre);
        errors.max_len("nombre", &self.nombre, MAX_NOMBRE);
        errors.optional_max_len("cargo", self.cargo.as_deref(), MAX_CORTO);
        errors.optional_email("correo", self.correo.as_deref());
        errors.optional_max_len("telefono", self.telefono.as_deref(), MAX_CORTO);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContacto {
    pub nombre: Option<String>,
    pub cargo: Option<String>,
    pub correo: Option<String>,
    pub telefono: Option<String>,
    pub activo: Option<bool>,
}

impl Validate for UpdateContacto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("nombre", self.nombre.as_deref());
        errors.optional_max_len("nombre", self.nombre.as_deref(), MAX_NOMBRE);
        errors.optional_max_len("cargo", self.cargo.as_deref(), MAX_CORTO);
        errors.optional_email("correo", self.correo.as_deref());
        errors.optional_max_len("telefono", self.telefono.as_deref(), MAX_CORTO);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDireccion {
    pub calle: String,
    pub numero: String,
    pub departamento: Option<String>,
    pub referencia: Option<String>,
    pub comuna_id: i32,
}

impl Validate for CreateDireccion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("calle", &self.calle);
        errors.max_len("calle", &self.calle, MAX_NOMBRE);
        errors.required("numero", &self.numero);
        errors.max_len("numero", &self.numero, 20);
        errors.optional_max_len("departamento", self.departamento.as_deref(), 50);
        errors.optional_max_len("referencia", self.referencia.as_deref(), 500);
        errors.positive_id("comunaId", self.comuna_id);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDireccion {
    pub calle: Option<String>,
    pub numero: Option<String>,
    pub departamento: Option<String>,
    pub referencia: Option<String>,
    pub comuna_id: Option<i32>,
}

impl Validate for UpdateDireccion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("calle", self.calle.as_deref());
        errors.optional_max_len("calle", self.calle.as_deref(), MAX_NOMBRE);
        errors.not_blank_if_present("numero", self.numero.as_deref());
        errors.optional_max_len("numero", self.numero.as_deref(), 20);
        errors.optional_max_len("departamento", self.departamento.as_deref(), 50);
        errors.optional_max_len("referencia", self.referencia.as_deref(), 500);
        errors.optional_positive_id("comunaId", self.comuna_id);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_bad_rut_and_email() {
        let empresa: CreateEmpresa = serde_json::from_value(json!({
            "nombre": "Comercial Andes",
            "rut": "12.345.678-9",
            "correo": "contacto-at-andes"
        }))
        .unwrap();
        let errors = empresa.validate().unwrap_err().into_inner();
        assert_eq!(errors["rut"], "RUT inválido");
        assert!(errors.contains_key("correo"));
    }

    #[test]
    fn accepts_formatted_rut() {
        let empresa: CreateEmpresa = serde_json::from_value(json!({
            "nombre": "Comercial Andes",
            "rut": "76.086.428-5"
        }))
        .unwrap();
        assert!(empresa.validate().is_ok());
    }

    #[test]
    fn import_row_tolerates_missing_columns() {
        let row: ImportEmpresaRow = serde_json::from_value(json!({ "nombre": " Ferretería Sur " })).unwrap();
        let empresa = CreateEmpresa::from(row);
        assert_eq!(empresa.nombre, "Ferretería Sur");
        assert!(empresa.validate().unwrap_err().contains("rut"));
    }

    #[test]
    fn direccion_requires_comuna() {
        let direccion: CreateDireccion = serde_json::from_value(json!({
            "calle": "Av. Providencia", "numero": "1234", "comunaId": 0
        }))
        .unwrap();
        assert!(direccion.validate().unwrap_err().contains("comunaId"));
    }
}
