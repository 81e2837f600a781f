use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::double_option;
use crate::types::{EstadoTicket, PrioridadTicket, TipoAccion};
use crate::validation::{Validate, ValidationErrors};

const MAX_TITULO: usize = 200;
const MAX_TEXTO: usize = 5000;
const MAX_NUMERO_CASO: usize = 50;

/// Prefix of case numbers generated from `tickets_numero_caso_seq`
pub const NUMERO_CASO_PREFIX: &str = "TCK-";

/// True for `TCK-` followed only by digits, the shape the sequence produces
pub fn is_generated_numero_caso(numero: &str) -> bool {
    numero
        .trim()
        .to_ascii_uppercase()
        .strip_prefix(NUMERO_CASO_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicket {
    pub numero_caso: Option<String>,
    pub titulo: String,
    pub descripcion: String,
    pub estado: Option<EstadoTicket>,
    pub prioridad: Option<PrioridadTicket>,
    pub empresa_id: i32,
    pub sucursal_id: Option<i32>,
    pub ubicacion_id: Option<i32>,
    pub contacto_id: Option<i32>,
    pub tecnico_id: Option<Uuid>,
    /// Description of the first action; blank means no initial action
    pub accion_inicial: Option<String>,
    pub tipo_accion_inicial: Option<TipoAccion>,
}

impl CreateTicket {
    /// Initial action text when one was actually supplied
    pub fn initial_action(&self) -> Option<&str> {
        self.accion_inicial
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Validate for CreateTicket {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("titulo", &self.titulo);
        errors.max_len("titulo", &self.titulo, MAX_TITULO);
        errors.required("descripcion", &self.descripcion);
        errors.max_len("descripcion", &self.descripcion, MAX_TEXTO);
        errors.not_blank_if_present("numeroCaso", self.numero_caso.as_deref());
        errors.optional_max_len("numeroCaso", self.numero_caso.as_deref(), MAX_NUMERO_CASO);
        if self.numero_caso.as_deref().is_some_and(is_generated_numero_caso) {
            errors.add("numeroCaso", "el formato TCK-NNNNNN está reservado para números generados");
        }
        errors.positive_id("empresaId", self.empresa_id);
        errors.optional_positive_id("sucursalId", self.sucursal_id);
        errors.optional_positive_id("ubicacionId", self.ubicacion_id);
        errors.optional_positive_id("contactoId", self.contacto_id);
        errors.optional_max_len("accionInicial", self.accion_inicial.as_deref(), MAX_TEXTO);
        errors.into_result()
    }
}

/// Partial update; nullable relations use `Some(None)` to clear
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicket {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub estado: Option<EstadoTicket>,
    pub prioridad: Option<PrioridadTicket>,
    pub empresa_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub sucursal_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ubicacion_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contacto_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tecnico_id: Option<Option<Uuid>>,
}

impl Validate for UpdateTicket {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("titulo", self.titulo.as_deref());
        errors.optional_max_len("titulo", self.titulo.as_deref(), MAX_TITULO);
        errors.not_blank_if_present("descripcion", self.descripcion.as_deref());
        errors.optional_max_len("descripcion", self.descripcion.as_deref(), MAX_TEXTO);
        errors.optional_positive_id("empresaId", self.empresa_id);
        errors.optional_positive_id("sucursalId", self.sucursal_id.flatten());
        errors.optional_positive_id("ubicacionId", self.ubicacion_id.flatten());
        errors.optional_positive_id("contactoId", self.contacto_id.flatten());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    pub estado: Option<EstadoTicket>,
    pub prioridad: Option<PrioridadTicket>,
    pub empresa_id: Option<i32>,
    pub tecnico_id: Option<Uuid>,
    /// Case-insensitive match on case number or title
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Highest page number honoured; larger requests are clamped
pub const MAX_PAGE: i64 = 100_000;

impl TicketFilter {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p > 0).unwrap_or(1).min(MAX_PAGE)
    }

    /// Rows to skip for a page of `limit` rows
    pub fn offset(&self, limit: i64) -> i64 {
        (self.page() - 1).saturating_mul(limit)
    }

    /// `%q%` pattern for ILIKE, with LIKE wildcards escaped
    pub fn search_pattern(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern)
    }
}

pub fn like_pattern(q: &str) -> String {
    let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccion {
    pub descripcion: String,
    pub tipo: Option<TipoAccion>,
    pub fecha: Option<DateTime<Utc>>,
}

impl Validate for CreateAccion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("descripcion", &self.descripcion);
        errors.max_len("descripcion", &self.descripcion, MAX_TEXTO);
        if self.tipo == Some(TipoAccion::CambioEstado) {
            errors.add("tipo", "CAMBIO_ESTADO se registra automáticamente");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccion {
    pub descripcion: Option<String>,
    pub tipo: Option<TipoAccion>,
}

impl Validate for UpdateAccion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank_if_present("descripcion", self.descripcion.as_deref());
        errors.optional_max_len("descripcion", self.descripcion.as_deref(), MAX_TEXTO);
        if self.tipo == Some(TipoAccion::CambioEstado) {
            errors.add("tipo", "CAMBIO_ESTADO se registra automáticamente");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(value: serde_json::Value) -> CreateTicket {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn minimal_ticket_is_valid() {
        let ticket = create(json!({
            "titulo": "Sin conexión en bodega",
            "descripcion": "El AP del segundo piso no responde",
            "empresaId": 3
        }));
        assert!(ticket.validate().is_ok());
        assert_eq!(ticket.initial_action(), None);
    }

    #[test]
    fn blank_initial_action_is_ignored() {
        let ticket = create(json!({
            "titulo": "t", "descripcion": "d", "empresaId": 1, "accionInicial": "   "
        }));
        assert_eq!(ticket.initial_action(), None);

        let ticket = create(json!({
            "titulo": "t", "descripcion": "d", "empresaId": 1, "accionInicial": " Revisión remota "
        }));
        assert_eq!(ticket.initial_action(), Some("Revisión remota"));
    }

    #[test]
    fn reports_every_invalid_field() {
        let ticket = create(json!({
            "numeroCaso": " ",
            "titulo": "",
            "descripcion": "",
            "empresaId": 0
        }));
        let errors = ticket.validate().unwrap_err();
        for field in ["numeroCaso", "titulo", "descripcion", "empresaId"] {
            assert!(errors.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn generated_case_number_shape_is_reserved() {
        assert!(is_generated_numero_caso("TCK-000123"));
        assert!(is_generated_numero_caso(" tck-42 "));
        assert!(!is_generated_numero_caso("TCK-"));
        assert!(!is_generated_numero_caso("TCK-2024-A"));
        assert!(!is_generated_numero_caso("INC-000123"));

        let ticket = create(json!({
            "numeroCaso": "TCK-000007", "titulo": "t", "descripcion": "d", "empresaId": 1
        }));
        assert!(ticket.validate().unwrap_err().contains("numeroCaso"));

        let ticket = create(json!({
            "numeroCaso": "MANT-2024-01", "titulo": "t", "descripcion": "d", "empresaId": 1
        }));
        assert!(ticket.validate().is_ok());
    }

    #[test]
    fn unknown_estado_fails_deserialization() {
        let result: Result<CreateTicket, _> = serde_json::from_value(json!({
            "titulo": "t", "descripcion": "d", "empresaId": 1, "estado": "PERDIDO"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn update_can_clear_assignee() {
        let update: UpdateTicket = serde_json::from_value(json!({ "tecnicoId": null })).unwrap();
        assert_eq!(update.tecnico_id, Some(None));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn manual_state_change_actions_are_rejected() {
        let accion: CreateAccion =
            serde_json::from_value(json!({ "descripcion": "x", "tipo": "CAMBIO_ESTADO" })).unwrap();
        assert!(accion.validate().unwrap_err().contains("tipo"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        let filter = TicketFilter { q: Some("  ".into()), ..Default::default() };
        assert_eq!(filter.search_pattern(), None);
        assert_eq!(filter.page(), 1);
    }

    #[test]
    fn huge_page_is_clamped_before_computing_offset() {
        let filter = TicketFilter { page: Some(i64::MAX), ..Default::default() };
        assert_eq!(filter.page(), MAX_PAGE);
        assert_eq!(filter.offset(100), (MAX_PAGE - 1) * 100);

        let first = TicketFilter { page: Some(-3), ..Default::default() };
        assert_eq!(first.offset(20), 0);
    }
}
