use crate::cli::ReviewCommands;
use crate::commands::common::{print_quotes, RunContext};
use crate::error::CliError;

pub async fn run_review(
    command: Option<ReviewCommands>,
    ctx: &RunContext,
) -> Result<(), CliError> {
    let service = ctx.open_local_service()?;

    match command.unwrap_or(ReviewCommands::List { json: false }) {
        ReviewCommands::List { json } => {
            let flagged = service.flagged_quotes().await;
            if flagged.is_empty() && !json {
                println!("No quotes are waiting for review.");
                return Ok(());
            }
            print_quotes(&flagged, json)?;
        }
        ReviewCommands::AcceptRemote => {
            let cleared = service.accept_remote().await?;
            println!("Kept server versions of {cleared} quote(s).");
        }
        ReviewCommands::AcceptLocal => {
            let removed = service.accept_local().await?;
            println!("Removed {removed} server-overwritten quote(s).");
        }
    }
    Ok(())
}
