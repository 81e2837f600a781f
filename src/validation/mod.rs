//! Request payload validation.
//!
//! Payloads are deserialized with serde (types, enums and required fields)
//! and then checked by [`Validate`], which collects every field error before
//! failing so the client sees them all at once.

pub mod rut;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::error::ApiError;

pub use rut::{normalize_rut, validate_rut};

/// Field name -> message
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message per field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "es obligatorio");
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("no puede superar {} caracteres", max));
        }
    }

    pub fn optional_max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            self.max_len(field, v, max);
        }
    }

    pub fn optional_email(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            if !is_email(v) {
                self.add(field, "no es un email válido");
            }
        }
    }

    pub fn positive_id(&mut self, field: &str, value: i32) {
        if value <= 0 {
            self.add(field, "debe ser un identificador válido");
        }
    }

    pub fn optional_positive_id(&mut self, field: &str, value: Option<i32>) {
        if let Some(v) = value {
            self.positive_id(field, v);
        }
    }

    pub fn not_blank_if_present(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.required(field, v);
        }
    }
}

/// Minimal structural check: one '@', non-empty local part, dotted domain
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

/// Payloads that can check their own invariants after deserialization
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Json extractor that runs [`Validate`] and maps failures to [`ApiError`]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_errors() {
        let mut errors = ValidationErrors::new();
        errors.required("titulo", "   ");
        errors.max_len("descripcion", &"x".repeat(11), 10);
        errors.optional_email("correo", Some("no-at-sign"));
        errors.positive_id("empresaId", 0);
        let map = errors.into_inner();
        assert_eq!(map.len(), 4);
        assert_eq!(map["titulo"], "es obligatorio");
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.required("nombre", "");
        errors.max_len("nombre", "", 0);
        errors.add("nombre", "otro");
        assert_eq!(errors.into_inner()["nombre"], "es obligatorio");
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("soporte@accesspoint.cl"));
        assert!(!is_email("soporte@cl"));
        assert!(!is_email("@accesspoint.cl"));
        assert!(!is_email("a@b@c.cl"));
        assert!(!is_email("a b@c.cl"));
    }

    #[test]
    fn blank_optional_email_is_accepted() {
        let mut errors = ValidationErrors::new();
        errors.optional_email("correo", Some(""));
        errors.optional_email("correo2", None);
        assert!(errors.is_empty());
    }
}
