use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quotes_core::config::{SyncConfig, DEFAULT_SYNC_INTERVAL_SECS};
use quotes_core::sync::{HttpQuoteSource, OfflineQuoteSource, RemoteQuoteSource};
use quotes_core::util::compact_text;
use quotes_core::{Quote, QuoteOrigin, QuoteService, SyncReport};
use serde::Serialize;

use crate::error::CliError;

const SERVER_URL_ENV: &str = "QUOTES_SERVER_URL";
const SYNC_INTERVAL_ENV: &str = "QUOTES_SYNC_INTERVAL_SECS";
const DB_PATH_ENV: &str = "QUOTES_DB_PATH";

/// Global options shared by every command
#[derive(Debug, Clone)]
pub struct RunContext {
    pub db_path: PathBuf,
    pub server_url: Option<String>,
    pub offline: bool,
}

impl RunContext {
    pub fn sync_config(&self, interval_secs: Option<u64>) -> Result<SyncConfig, CliError> {
        resolve_sync_config(
            self.server_url.clone(),
            env::var(SERVER_URL_ENV).ok(),
            interval_secs,
            env::var(SYNC_INTERVAL_ENV).ok(),
        )
    }

    pub fn remote(&self) -> Result<Arc<dyn RemoteQuoteSource>, CliError> {
        if self.offline {
            return Ok(Arc::new(OfflineQuoteSource));
        }
        let config =
            resolve_remote_config(self.server_url.clone(), env::var(SERVER_URL_ENV).ok())?;
        Ok(Arc::new(HttpQuoteSource::new(&config)?))
    }

    pub fn open_service(&self) -> Result<QuoteService, CliError> {
        let remote = self.remote()?;
        Ok(QuoteService::open_path(&self.db_path, remote)?)
    }

    /// Open the store without any remote side effects.
    pub fn open_local_service(&self) -> Result<QuoteService, CliError> {
        Ok(QuoteService::open_path(
            &self.db_path,
            Arc::new(OfflineQuoteSource),
        )?)
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteListItem {
    pub id: String,
    pub text: String,
    pub category: String,
    pub updated_at: i64,
    pub relative_time: String,
    pub origin: QuoteOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<i64>,
    pub resolved_remote: bool,
}

pub fn format_quote_lines(quotes: &[Quote]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    quotes
        .iter()
        .map(|quote| {
            let id = quote.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let preview = quote_preview(quote, 48);
            let relative_time = format_relative_time(quote.updated_at, now_ms);
            let marker = if quote.resolved_remote { "  (server)" } else { "" };

            format!(
                "{short_id:<13}  {preview:<48}  {:<12}  {relative_time}{marker}",
                quote.category
            )
        })
        .collect()
}

pub fn quote_to_list_item(quote: &Quote) -> QuoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    QuoteListItem {
        id: quote.id.to_string(),
        text: quote.text.clone(),
        category: quote.category.clone(),
        updated_at: quote.updated_at,
        relative_time: format_relative_time(quote.updated_at, now_ms),
        origin: quote.origin,
        server_id: quote.server_id,
        resolved_remote: quote.resolved_remote,
    }
}

pub fn print_quotes(quotes: &[Quote], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = quotes
            .iter()
            .map(quote_to_list_item)
            .collect::<Vec<QuoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_quote_lines(quotes) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn quote_preview(quote: &Quote, max_chars: usize) -> String {
    let collapsed = compact_text(&quote.text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_report_lines(report: &SyncReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  added={} updated={} unchanged={} total={}",
        format_sync_timestamp(report.synced_at),
        report.added,
        report.updated,
        report.unchanged,
        report.total_after
    )];

    if report.has_changes() {
        lines.push("Quotes synced with server!".to_string());
    }
    if !report.resolved.is_empty() {
        lines.push(format!(
            "{} quote(s) were overwritten by the server. Run `quotes review list` to inspect them.",
            report.resolved.len()
        ));
    }
    lines
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_last_sync(last_synced_at: Option<i64>) -> String {
    last_synced_at.map_or_else(
        || "Last sync: never".to_string(),
        |timestamp_ms| format!("Last sync: {}", format_sync_timestamp(timestamp_ms)),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn resolve_quote_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_content(&text_parts.join(" ")) {
        return Ok(text);
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(text);
    }

    Err(CliError::EmptyText)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Endpoint-only configuration for commands that never run the sync timer.
pub fn resolve_remote_config(
    server_url: Option<String>,
    env_server_url: Option<String>,
) -> Result<SyncConfig, CliError> {
    match server_url.or(env_server_url) {
        Some(url) => Ok(SyncConfig::new(url)?),
        None => Ok(SyncConfig::default()),
    }
}

/// Build the sync configuration. Explicit values win over environment values.
pub fn resolve_sync_config(
    server_url: Option<String>,
    env_server_url: Option<String>,
    interval_secs: Option<u64>,
    env_interval_secs: Option<String>,
) -> Result<SyncConfig, CliError> {
    let mut config = resolve_remote_config(server_url, env_server_url)?;

    let interval_secs = match interval_secs {
        Some(secs) => secs,
        None => env_interval_secs
            .as_deref()
            .map(parse_interval_secs)
            .transpose()?
            .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS),
    };
    if interval_secs == 0 {
        return Err(CliError::Config(
            "sync interval must be at least one second".to_string(),
        ));
    }
    config = config.with_sync_interval(Duration::from_secs(interval_secs));
    Ok(config)
}

pub fn parse_interval_secs(raw: &str) -> Result<u64, CliError> {
    raw.trim().parse::<u64>().map_err(|_| {
        CliError::Config(format!(
            "{SYNC_INTERVAL_ENV} must be a whole number of seconds, got '{raw}'"
        ))
    })
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_db_path.or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("quotes").join("quotes.db"))
        .ok_or_else(|| {
            CliError::Config(format!(
                "Failed to resolve a data directory; pass --db-path or set {DB_PATH_ENV}"
            ))
        })
}

/// Resolve where an export should be written. Directories get a timestamped file name.
pub fn resolve_export_path(output: &Path, now_ms: i64) -> PathBuf {
    if output.is_dir() {
        output.join(quotes_core::export::suggested_export_file_name(now_ms))
    } else {
        output.to_path_buf()
    }
}
