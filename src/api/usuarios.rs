use serde::Deserialize;

use crate::types::Rol;
use crate::validation::{is_email, Validate, ValidationErrors};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsuario {
    pub email: String,
    pub nombre: String,
    pub rol: Option<Rol>,
}

impl Validate for CreateUsuario {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("email", &self.email);
        if !self.email.trim().is_empty() && !is_email(&self.email) {
            errors.add("email", "no es un email válido");
        }
        errors.required("nombre", &self.nombre);
        errors.max_len("nombre", &self.nombre, 200);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsuario {
    pub nombre: Option<String>,
    pub rol: Option<Rol>,
    pub activo: Option<bool>,
}

impl Validate for UpdateUsuario {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("nombre", self.nombre.as_deref());
        errors.optional_max_len("nombre", self.nombre.as_deref(), 200);
        errors.into_result()
    }
}
