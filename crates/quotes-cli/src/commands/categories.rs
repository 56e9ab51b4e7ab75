use crate::commands::common::RunContext;
use crate::error::CliError;

pub async fn run_categories(ctx: &RunContext) -> Result<(), CliError> {
    let service = ctx.open_local_service()?;
    let selected = service.selected_category().await;

    for category in service.categories().await {
        let marker = if category == selected { "*" } else { " " };
        println!("{marker} {category}");
    }
    Ok(())
}
