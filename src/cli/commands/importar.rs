use std::path::PathBuf;

use anyhow::Context;

use crate::cli::{utils::output_success, OutputFormat};
use crate::services::empresa_import::parse_csv;
use crate::services::EmpresaImportService;

pub async fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let reader = std::fs::File::open(&file).with_context(|| format!("opening {}", file.display()))?;
    let rows = parse_csv(reader).with_context(|| format!("parsing {}", file.display()))?;

    let summary = EmpresaImportService::new()?.import(rows).await?;

    if output_format == OutputFormat::Text {
        for error in &summary.errores {
            eprintln!(
                "  fila {} ({}): {}",
                error.fila,
                error.rut.as_deref().unwrap_or("sin RUT"),
                error.error
            );
        }
    }
    output_success(
        output_format,
        &format!(
            "{} of {} empresas imported, {} rejected",
            summary.exitosos, summary.total, summary.fallidos
        ),
        Some(serde_json::to_value(&summary)?),
    )
}
