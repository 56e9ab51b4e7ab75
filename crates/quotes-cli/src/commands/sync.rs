use std::time::Duration;

use quotes_core::config::DEFAULT_SYNC_INTERVAL_SECS;
use quotes_core::{SyncReport, SyncScheduler};

use crate::commands::common::{format_last_sync, format_report_lines, RunContext};
use crate::error::CliError;

pub async fn run_sync(ctx: &RunContext) -> Result<(), CliError> {
    if ctx.offline {
        return Err(CliError::SyncDisabled);
    }

    let service = ctx.open_service()?;
    println!("{}", format_last_sync(service.last_synced_at().await));
    let report = service.sync_with_remote().await?;
    print_report(&report);
    Ok(())
}

/// Sync on an interval until interrupted with Ctrl-C.
pub async fn run_sync_watch(
    interval_secs: Option<u64>,
    ctx: &RunContext,
) -> Result<(), CliError> {
    if ctx.offline {
        return Err(CliError::SyncDisabled);
    }

    let config = ctx.sync_config(interval_secs)?;
    let interval = config
        .sync_interval
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS));
    let service = ctx.open_service()?;

    println!("Syncing every {}s. Press Ctrl-C to stop.", interval.as_secs());
    let scheduler = SyncScheduler::start(service, interval);
    let mut reports = scheduler.reports();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = reports.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = reports.borrow_and_update().clone();
                if let Some(report) = latest {
                    print_report(&report);
                }
            }
        }
    }

    scheduler.stop().await;
    Ok(())
}

fn print_report(report: &SyncReport) {
    for line in format_report_lines(report) {
        println!("{line}");
    }
}
