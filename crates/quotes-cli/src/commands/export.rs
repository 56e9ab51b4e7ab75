use std::path::Path;

use chrono::Utc;

use crate::commands::common::{resolve_export_path, RunContext};
use crate::error::CliError;

pub async fn run_export(output_path: Option<&Path>, ctx: &RunContext) -> Result<(), CliError> {
    let service = ctx.open_local_service()?;
    let rendered = service.export_snapshot().await?;

    if let Some(output) = output_path {
        let path = resolve_export_path(output, Utc::now().timestamp_millis());
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
