use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::services::{GeoSnapshot, GeografiaBackupService};

#[derive(Subcommand)]
pub enum GeografiaCommands {
    #[command(about = "Write a JSON snapshot of paises, regiones, provincias and comunas")]
    Backup {
        #[arg(long, help = "Output file")]
        output: PathBuf,
    },

    #[command(about = "Replace all geography rows with a snapshot")]
    Restore {
        #[arg(long, help = "Snapshot file written by `geografia backup`")]
        input: PathBuf,
    },
}

pub async fn handle(cmd: GeografiaCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = GeografiaBackupService::new()?;

    match cmd {
        GeografiaCommands::Backup { output } => {
            let snapshot = service.backup().await?;
            let body = serde_json::to_string_pretty(&snapshot)?;
            std::fs::write(&output, body).with_context(|| format!("writing {}", output.display()))?;

            output_success(
                output_format,
                &format!("Backup written to {}", output.display()),
                Some(json!({
                    "checksum": snapshot.checksum,
                    "paises": snapshot.paises.len(),
                    "regiones": snapshot.regiones.len(),
                    "provincias": snapshot.provincias.len(),
                    "comunas": snapshot.comunas.len(),
                })),
            )
        }
        GeografiaCommands::Restore { input } => {
            let body = std::fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let snapshot: GeoSnapshot =
                serde_json::from_str(&body).with_context(|| format!("parsing {}", input.display()))?;

            let report = service.restore(&snapshot).await?;
            output_success(output_format, "Geography restored", Some(serde_json::to_value(&report)?))
        }
    }
}
