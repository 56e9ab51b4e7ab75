//! JSON export and import helpers shared by all clients.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Quote, QuoteId, QuoteOrigin};
use crate::util::{normalize_text_option, unix_timestamp_ms_now};

/// Render quotes as pretty-printed JSON, preserving order.
pub fn render_json_export(quotes: &[Quote]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(quotes)
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(timestamp_ms: i64) -> String {
    format!("quotes-export-{timestamp_ms}.json")
}

/// Turn an import payload into candidate quotes.
///
/// The payload must be a JSON array. `text` and `category` are trimmed, and
/// elements where either ends up empty are dropped. Optional fields (`id`, `updatedAt`, `serverId`,
/// `origin`, `resolvedRemote`) are kept when well-formed so that an export
/// imports back unchanged; otherwise they get fresh defaults.
pub fn parse_import_payload(payload: &Value) -> Result<Vec<Quote>> {
    let Value::Array(items) = payload else {
        return Err(Error::InvalidInput(
            "import payload must be a JSON array of quotes".to_string(),
        ));
    };

    let candidates = items
        .iter()
        .filter_map(candidate_from_value)
        .collect::<Vec<_>>();
    tracing::debug!(
        "Import payload: {} of {} items usable",
        candidates.len(),
        items.len()
    );
    Ok(candidates)
}

fn candidate_from_value(value: &Value) -> Option<Quote> {
    let object = value.as_object()?;
    let text = normalize_text_option(object.get("text")?.as_str().map(str::to_string))?;
    let category = normalize_text_option(object.get("category")?.as_str().map(str::to_string))?;

    let mut quote = Quote::new(text, category);
    if let Some(id) = object
        .get("id")
        .and_then(Value::as_str)
        .and_then(|id| id.parse::<QuoteId>().ok())
    {
        quote.id = id;
    }
    quote.updated_at = object
        .get("updatedAt")
        .and_then(Value::as_i64)
        .unwrap_or_else(unix_timestamp_ms_now);
    quote.server_id = object.get("serverId").and_then(Value::as_i64);
    quote.origin = object
        .get("origin")
        .and_then(|origin| serde_json::from_value::<QuoteOrigin>(origin.clone()).ok())
        .unwrap_or_default();
    quote.resolved_remote = object
        .get("resolvedRemote")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(quote)
}
