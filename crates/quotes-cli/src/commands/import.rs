use std::path::Path;

use crate::commands::common::RunContext;
use crate::error::CliError;

pub async fn run_import(path: &Path, ctx: &RunContext) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(path)?;

    let service = ctx.open_local_service()?;
    let imported = service.import_json(&raw).await?;

    println!("Imported {imported} quote(s) from {}", path.display());
    Ok(())
}
