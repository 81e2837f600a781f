use std::io::Read;

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::api::empresas::{CreateEmpresa, ImportEmpresaRow};
use crate::database::empresas::insert_empresa;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::error::ApiError;
use crate::validation::{normalize_rut, Validate};

/// Data rows start at line 2; line 1 is the CSV header
const FIRST_DATA_LINE: usize = 2;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    pub fila: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub exitosos: usize,
    pub fallidos: usize,
    pub errores: Vec<ImportRowError>,
}

impl ImportSummary {
    fn fail(&mut self, fila: usize, rut: Option<String>, error: impl Into<String>) {
        self.fallidos += 1;
        self.errores.push(ImportRowError {
            fila,
            rut,
            error: error.into(),
        });
    }
}

/// Parse a CSV file into one JSON object per row, keyed by lower-cased header
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_lowercase()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), Value::String(value.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

/// Turn a raw row into a validated payload, or the message explaining why it was rejected
pub fn prepare_row(raw: Value) -> Result<CreateEmpresa, (Option<String>, String)> {
    let row: ImportEmpresaRow =
        serde_json::from_value(raw).map_err(|e| (None, format!("Fila con formato inválido: {}", e)))?;
    let input = CreateEmpresa::from(row);
    let rut = Some(input.rut.clone()).filter(|r| !r.is_empty()).map(|r| normalize_rut(&r));

    if let Err(errors) = input.validate() {
        let message = errors
            .into_inner()
            .into_iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect::<Vec<_>>()
            .join("; ");
        return Err((rut, message));
    }
    Ok(input)
}

pub struct EmpresaImportService {
    pool: PgPool,
}

impl EmpresaImportService {
    pub fn new() -> Result<Self, DatabaseError> {
        Ok(Self {
            pool: DatabaseManager::pool()?,
        })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate and insert each row independently. Row-level failures are reported
    /// in the summary; only a lost database connection aborts the import.
    pub async fn import(&self, rows: Vec<Value>) -> Result<ImportSummary, DatabaseError> {
        let mut summary = ImportSummary {
            total: rows.len(),
            ..Default::default()
        };

        for (index, raw) in rows.into_iter().enumerate() {
            let fila = index + FIRST_DATA_LINE;

            let input = match prepare_row(raw) {
                Ok(input) => input,
                Err((rut, message)) => {
                    summary.fail(fila, rut, message);
                    continue;
                }
            };

            match insert_empresa(&self.pool, &input).await {
                Ok(_) => summary.exitosos += 1,
                Err(e) if e.is_connection_error() => return Err(e),
                Err(e) => {
                    let message = ApiError::from(e).message().to_string();
                    summary.fail(fila, Some(normalize_rut(&input.rut)), message);
                }
            }
        }

        info!(
            total = summary.total,
            exitosos = summary.exitosos,
            fallidos = summary.fallidos,
            "Empresa import finished"
        );
        if summary.fallidos > 0 {
            warn!("{} rows rejected during empresa import", summary.fallidos);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_csv_with_trimmed_lowercase_headers() {
        let csv = "Nombre, RUT ,giro\nAccess Ltda, 76.086.428-5 ,Redes\nSin Rut,,\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], json!({ "nombre": "Access Ltda", "rut": "76.086.428-5", "giro": "Redes" }));
        assert_eq!(rows[1]["rut"], "");
    }

    #[test]
    fn prepares_valid_row_with_normalized_fields() {
        let input = prepare_row(json!({ "nombre": " Access Ltda ", "rut": "76.086.428-5", "correo": "" })).unwrap();
        assert_eq!(input.nombre, "Access Ltda");
        assert_eq!(input.correo, None);
    }

    #[test]
    fn rejects_bad_rut_with_field_message() {
        let (rut, message) = prepare_row(json!({ "nombre": "X", "rut": "76.086.428-1" })).unwrap_err();
        assert_eq!(rut.as_deref(), Some("76086428-1"));
        assert!(message.starts_with("rut:"), "{}", message);
    }

    #[test]
    fn multibyte_rut_fails_only_its_row() {
        let (rut, message) = prepare_row(json!({ "nombre": "Ñandú SpA", "rut": "1234567ñ" })).unwrap_err();
        assert_eq!(rut.as_deref(), Some("1234567-ñ"));
        assert!(message.starts_with("rut:"), "{}", message);
    }

    #[test]
    fn rejects_non_object_rows() {
        let (rut, message) = prepare_row(json!(["Access", "76086428-5"])).unwrap_err();
        assert_eq!(rut, None);
        assert!(message.contains("formato inválido"));
    }

    #[test]
    fn summary_counts_failures() {
        let mut summary = ImportSummary { total: 3, exitosos: 2, ..Default::default() };
        summary.fail(4, None, "nombre: es obligatorio");
        assert_eq!(summary.fallidos, 1);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["errores"][0], json!({ "fila": 4, "error": "nombre: es obligatorio" }));
    }
}
