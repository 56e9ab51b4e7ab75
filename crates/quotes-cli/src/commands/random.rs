use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::commands::common::RunContext;
use crate::error::CliError;

pub async fn run_random(
    category: Option<&str>,
    seed: Option<u64>,
    ctx: &RunContext,
) -> Result<(), CliError> {
    let service = ctx.open_local_service()?;
    if category.is_some() {
        service.filter_by_category(category).await?;
    }

    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    match service.random_quote(&mut rng).await {
        Some(quote) => println!("{}", quote.display_line()),
        None => println!("No quotes available in this category."),
    }
    Ok(())
}
