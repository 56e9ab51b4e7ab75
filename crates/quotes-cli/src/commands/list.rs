use crate::commands::common::{print_quotes, RunContext};
use crate::error::CliError;

pub async fn run_list(
    category: Option<&str>,
    as_json: bool,
    ctx: &RunContext,
) -> Result<(), CliError> {
    let service = ctx.open_local_service()?;
    let quotes = match category {
        Some(label) => service.filter_by_category(Some(label)).await?,
        None => service.list_quotes().await,
    };

    if quotes.is_empty() && !as_json {
        println!("No quotes found.");
        return Ok(());
    }

    print_quotes(&quotes, as_json)
}
