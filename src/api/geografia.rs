use serde::Deserialize;
use std::str::FromStr;

use crate::validation::ValidationErrors;

/// Level of the administrative hierarchy, as it appears in the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nivel {
    Pais,
    Region,
    Provincia,
    Comuna,
}

impl Nivel {
    /// Parents first
    pub const ALL: [Nivel; 4] = [Nivel::Pais, Nivel::Region, Nivel::Provincia, Nivel::Comuna];

    pub fn table(&self) -> &'static str {
        match self {
            Nivel::Pais => "paises",
            Nivel::Region => "regiones",
            Nivel::Provincia => "provincias",
            Nivel::Comuna => "comunas",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Nivel::Pais => "País",
            Nivel::Region => "Región",
            Nivel::Provincia => "Provincia",
            Nivel::Comuna => "Comuna",
        }
    }

    /// Foreign-key column pointing at the parent level
    pub fn parent_column(&self) -> Option<&'static str> {
        match self {
            Nivel::Pais => None,
            Nivel::Region => Some("pais_id"),
            Nivel::Provincia => Some("region_id"),
            Nivel::Comuna => Some("provincia_id"),
        }
    }

    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            Nivel::Pais => None,
            Nivel::Region => Some("paisId"),
            Nivel::Provincia => Some("regionId"),
            Nivel::Comuna => Some("provinciaId"),
        }
    }
}

impl FromStr for Nivel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paises" | "pais" => Ok(Nivel::Pais),
            "regiones" | "region" => Ok(Nivel::Region),
            "provincias" | "provincia" => Ok(Nivel::Provincia),
            "comunas" | "comuna" => Ok(Nivel::Comuna),
            other => Err(format!("Nivel geográfico desconocido: {}", other)),
        }
    }
}

/// Create/update payload for any level; only the parent id matching the level is read
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInput {
    pub nombre: Option<String>,
    pub pais_id: Option<i32>,
    pub region_id: Option<i32>,
    pub provincia_id: Option<i32>,
}

impl GeoInput {
    pub fn parent_id(&self, nivel: Nivel) -> Option<i32> {
        match nivel {
            Nivel::Pais => None,
            Nivel::Region => self.pais_id,
            Nivel::Provincia => self.region_id,
            Nivel::Comuna => self.provincia_id,
        }
    }

    pub fn nombre(&self) -> Option<&str> {
        self.nombre.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// On create both the name and the level's parent are mandatory
    pub fn validate_create(&self, nivel: Nivel) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("nombre", self.nombre.as_deref().unwrap_or(""));
        errors.optional_max_len("nombre", self.nombre.as_deref(), 120);
        if let Some(field) = nivel.parent_field() {
            match self.parent_id(nivel) {
                Some(id) => errors.positive_id(field, id),
                None => errors.add(field, "es obligatorio"),
            }
        }
        errors.into_result()
    }

    pub fn validate_update(&self, nivel: Nivel) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("nombre", self.nombre.as_deref());
        errors.optional_max_len("nombre", self.nombre.as_deref(), 120);
        if let (Some(field), Some(id)) = (nivel.parent_field(), self.parent_id(nivel)) {
            errors.positive_id(field, id);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFilter {
    pub pais_id: Option<i32>,
    pub region_id: Option<i32>,
    pub provincia_id: Option<i32>,
}

impl GeoFilter {
    pub fn parent_id(&self, nivel: Nivel) -> Option<i32> {
        match nivel {
            Nivel::Pais => None,
            Nivel::Region => self.pais_id,
            Nivel::Provincia => self.region_id,
            Nivel::Comuna => self.provincia_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuscarQuery {
    pub q: Option<String>,
}

impl BuscarQuery {
    /// Trimmed, non-empty search term
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_url_segments() {
        assert_eq!("regiones".parse::<Nivel>().unwrap(), Nivel::Region);
        assert_eq!("comuna".parse::<Nivel>().unwrap(), Nivel::Comuna);
        assert!("ciudades".parse::<Nivel>().is_err());
    }

    #[test]
    fn create_requires_level_parent() {
        let input: GeoInput = serde_json::from_value(json!({ "nombre": "Maipo" })).unwrap();
        assert!(input.validate_create(Nivel::Pais).is_ok());
        let errors = input.validate_create(Nivel::Provincia).unwrap_err();
        assert!(errors.contains("regionId"));

        let input: GeoInput =
            serde_json::from_value(json!({ "nombre": "Maipo", "regionId": 13 })).unwrap();
        assert!(input.validate_create(Nivel::Provincia).is_ok());
    }

    #[test]
    fn search_term_must_not_be_blank() {
        assert_eq!(BuscarQuery { q: Some("  ".into()) }.term(), None);
        assert_eq!(BuscarQuery { q: None }.term(), None);
        assert_eq!(BuscarQuery { q: Some(" ñuñoa ".into()) }.term(), Some("ñuñoa"));
    }
}
