use anyhow::Context;

use crate::cli::{utils::output_success, OutputFormat};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    DatabaseManager::migrate().await.context("running migrations")?;
    output_success(output_format, "Migrations applied", None)
}
