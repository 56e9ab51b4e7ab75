use crate::commands::common::{resolve_quote_text, RunContext};
use crate::error::CliError;

pub async fn run_add(
    text_parts: &[String],
    category: &str,
    ctx: &RunContext,
) -> Result<(), CliError> {
    let text = resolve_quote_text(text_parts)?;

    let service = ctx.open_service()?;
    let quote = service.add_quote(&text, category).await?;

    println!("{}", quote.id);
    Ok(())
}
