//! One-directional merge of remote candidates into the local list.
//!
//! Records are matched through a single identity key function. When a match
//! differs in text or category, the remote content overwrites the local one
//! and the record is flagged as resolved in favor of remote. There is no
//! negotiation: remote always wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Quote, QuoteId};
use crate::util::has_text;

/// A quote candidate fetched from the remote source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQuote {
    pub server_id: Option<i64>,
    pub text: String,
    pub category: String,
}

impl RemoteQuote {
    #[must_use]
    pub fn new(
        server_id: Option<i64>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            server_id,
            text: text.into(),
            category: category.into(),
        }
    }

    fn is_valid(&self) -> bool {
        has_text(&self.text) && has_text(&self.category)
    }
}

/// Key used to pair a remote candidate with a local record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    ServerId(i64),
    Text(String),
}

/// Signature of the identity key function handed to [`merge_quotes`]
pub type KeyFn = fn(Option<i64>, &str) -> IdentityKey;

/// Default identity policy: the server id when known, otherwise the text.
///
/// A record with a server id never matches a candidate by text, and the other
/// way round.
#[must_use]
pub fn identity_key(server_id: Option<i64>, text: &str) -> IdentityKey {
    server_id.map_or_else(|| IdentityKey::Text(text.to_string()), IdentityKey::ServerId)
}

/// Outcome of a merge, for presentation to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Remote candidates appended as new records
    pub added: usize,
    /// Local records overwritten by remote content
    pub updated: usize,
    /// Remote candidates identical to their local match
    pub unchanged: usize,
    /// Ids of the records flagged resolved-remote by this merge
    pub resolved: Vec<QuoteId>,
    pub total_before: usize,
    pub total_after: usize,
    /// Merge timestamp (Unix ms)
    pub synced_at: i64,
}

impl SyncReport {
    #[must_use]
    pub const fn size_changed(&self) -> bool {
        self.total_before != self.total_after
    }

    #[must_use]
    pub const fn content_changed(&self) -> bool {
        self.updated > 0
    }

    /// Whether the caller should offer a "review changes" step
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.size_changed() || self.content_changed()
    }
}

/// Merge `remote` candidates into `local` in place.
///
/// Local records keep their order; new records are appended in candidate
/// order. When several local records share a key, the first one is matched.
/// Candidates with an empty text or category are skipped.
pub fn merge_quotes(
    local: &mut Vec<Quote>,
    remote: &[RemoteQuote],
    key_fn: KeyFn,
    now_ms: i64,
) -> SyncReport {
    let total_before = local.len();
    let mut index: HashMap<IdentityKey, usize> = HashMap::with_capacity(local.len());
    for (position, quote) in local.iter().enumerate() {
        index
            .entry(key_fn(quote.server_id, &quote.text))
            .or_insert(position);
    }

    let mut added = 0;
    let mut updated = 0;
    let mut unchanged = 0;
    let mut resolved = Vec::new();

    for candidate in remote {
        if !candidate.is_valid() {
            tracing::debug!("Skipping remote candidate without text/category");
            continue;
        }

        let key = key_fn(candidate.server_id, &candidate.text);
        match index.get(&key).copied() {
            None => {
                local.push(Quote::from_remote(
                    candidate.server_id,
                    candidate.text.clone(),
                    candidate.category.clone(),
                    now_ms,
                ));
                index.insert(key, local.len() - 1);
                added += 1;
            }
            Some(position) => {
                let existing = &mut local[position];
                if existing.text == candidate.text && existing.category == candidate.category {
                    unchanged += 1;
                    continue;
                }

                existing.text.clone_from(&candidate.text);
                existing.category.clone_from(&candidate.category);
                existing.updated_at = now_ms;
                existing.resolved_remote = true;
                if !resolved.contains(&existing.id) {
                    resolved.push(existing.id);
                }
                updated += 1;
            }
        }
    }

    SyncReport {
        added,
        updated,
        unchanged,
        resolved,
        total_before,
        total_after: local.len(),
        synced_at: now_ms,
    }
}
