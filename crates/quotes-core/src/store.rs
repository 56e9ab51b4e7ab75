//! The quote store: an ordered quote list kept equal to its persisted copy.

use rand::Rng;
use serde_json::Value;

use crate::db::{KeyValueStore, LAST_SYNCED_AT_KEY, QUOTES_KEY, SELECTED_CATEGORY_KEY};
use crate::error::{Error, Result};
use crate::export::{parse_import_payload, render_json_export};
use crate::models::{default_quotes, Quote, QuoteId};
use crate::sync::{merge_quotes, KeyFn, RemoteQuote, SyncReport};
use crate::util::{normalize_text_option, unix_timestamp_ms_now};

/// Pseudo-category that selects every quote
pub const ALL_CATEGORIES: &str = "All";

/// Pick one element uniformly at random; `None` when `items` is empty.
pub fn pick_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// Quotes in `category`, or every quote for [`ALL_CATEGORIES`].
pub fn filter_quotes<'a>(quotes: &'a [Quote], category: &str) -> Vec<&'a Quote> {
    if category == ALL_CATEGORIES {
        quotes.iter().collect()
    } else {
        quotes
            .iter()
            .filter(|quote| quote.in_category(category))
            .collect()
    }
}

/// In-memory quote list backed by a [`KeyValueStore`].
///
/// Every mutation builds the next list, persists it, and only then replaces
/// the in-memory copy, so a failed save leaves the store as it was.
pub struct QuoteStore {
    quotes: Vec<Quote>,
    selected_category: String,
    last_synced_at: Option<i64>,
    storage: Box<dyn KeyValueStore + Send>,
}

impl QuoteStore {
    /// Load the store from `storage`.
    ///
    /// A missing or unreadable quote list falls back to the built-in defaults.
    pub fn open(storage: impl KeyValueStore + Send + 'static) -> Result<Self> {
        let quotes = match storage.load(QUOTES_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<Quote>>(&raw).unwrap_or_else(|error| {
                tracing::warn!("Stored quote list is unreadable ({error}); using defaults");
                default_quotes()
            }),
            None => {
                tracing::debug!("No stored quote list; using defaults");
                default_quotes()
            }
        };
        let selected_category = normalize_text_option(storage.load(SELECTED_CATEGORY_KEY)?)
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());
        let last_synced_at = storage
            .load(LAST_SYNCED_AT_KEY)?
            .and_then(|raw| raw.trim().parse::<i64>().ok());

        Ok(Self {
            quotes,
            selected_category,
            last_synced_at,
            storage: Box::new(storage),
        })
    }

    /// Create a store holding exactly `quotes`, persisting them immediately.
    pub fn with_quotes(
        storage: impl KeyValueStore + Send + 'static,
        quotes: Vec<Quote>,
    ) -> Result<Self> {
        let mut store = Self {
            quotes: Vec::new(),
            selected_category: ALL_CATEGORIES.to_string(),
            last_synced_at: None,
            storage: Box::new(storage),
        };
        store.commit(quotes)?;
        Ok(store)
    }

    fn commit(&mut self, next: Vec<Quote>) -> Result<()> {
        let serialized = serde_json::to_string(&next)?;
        self.storage.save(QUOTES_KEY, &serialized)?;
        self.quotes = next;
        Ok(())
    }

    /// Append a new quote. Both fields are trimmed and must be non-empty.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote> {
        let text =
            normalize_text_option(Some(text.to_string())).ok_or(Error::MissingField("text"))?;
        let category = normalize_text_option(Some(category.to_string()))
            .ok_or(Error::MissingField("category"))?;

        let quote = Quote::new(text, category);
        let mut next = self.quotes.clone();
        next.push(quote.clone());
        self.commit(next)?;

        tracing::info!("Added quote {} in '{}'", quote.id, quote.category);
        Ok(quote)
    }

    /// Select `label` (or everything for `None`/`"All"`), remember it as the
    /// default selection, and return the matching quotes in order.
    pub fn filter_by_category(&mut self, label: Option<&str>) -> Result<Vec<Quote>> {
        let label = label
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(ALL_CATEGORIES);

        self.storage.save(SELECTED_CATEGORY_KEY, label)?;
        self.selected_category = label.to_string();

        Ok(filter_quotes(&self.quotes, label)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Quotes matching the current selection, without touching storage
    pub fn filtered(&self) -> Vec<&Quote> {
        filter_quotes(&self.quotes, &self.selected_category)
    }

    /// `"All"` followed by each distinct category in order of first appearance
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for quote in &self.quotes {
            if !categories.iter().any(|known| known == &quote.category) {
                categories.push(quote.category.clone());
            }
        }
        categories
    }

    /// Random quote from the current selection
    pub fn random_quote<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Quote> {
        let filtered = self.filtered();
        pick_random(&filtered, rng).copied()
    }

    /// Append valid candidates whose text is not already present.
    ///
    /// Returns how many were accepted; zero is not an error. A payload that is
    /// not a JSON array is rejected without any change.
    pub fn import_quotes(&mut self, payload: &Value) -> Result<usize> {
        let candidates = parse_import_payload(payload)?;

        let mut next = self.quotes.clone();
        let mut accepted = 0;
        for candidate in candidates {
            if next.iter().any(|quote| quote.text == candidate.text) {
                continue;
            }
            next.push(candidate);
            accepted += 1;
        }

        if accepted > 0 {
            self.commit(next)?;
        }
        tracing::info!("Imported {accepted} quotes");
        Ok(accepted)
    }

    /// Parse raw JSON text and import it; unparsable text changes nothing.
    pub fn import_json(&mut self, raw: &str) -> Result<usize> {
        let payload = serde_json::from_str::<Value>(raw)?;
        self.import_quotes(&payload)
    }

    /// Pretty-printed JSON of the whole list
    pub fn export_snapshot(&self) -> Result<String> {
        Ok(render_json_export(&self.quotes)?)
    }

    /// Merge remote candidates (remote wins), persist, and stamp the sync time.
    pub fn merge_remote(
        &mut self,
        candidates: &[RemoteQuote],
        key_fn: KeyFn,
    ) -> Result<SyncReport> {
        let now = unix_timestamp_ms_now();
        let mut next = self.quotes.clone();
        let report = merge_quotes(&mut next, candidates, key_fn, now);
        self.commit(next)?;
        self.last_synced_at = Some(now);
        if let Err(error) = self.storage.save(LAST_SYNCED_AT_KEY, &now.to_string()) {
            tracing::warn!("Failed to record sync time: {error}");
        }
        Ok(report)
    }

    /// Keep the merged state and clear every resolved-remote flag.
    ///
    /// Returns the number of flags cleared.
    pub fn accept_remote(&mut self) -> Result<usize> {
        let mut next = self.quotes.clone();
        let mut cleared = 0;
        for quote in next.iter_mut().filter(|quote| quote.resolved_remote) {
            quote.resolved_remote = false;
            cleared += 1;
        }
        if cleared > 0 {
            self.commit(next)?;
        }
        Ok(cleared)
    }

    /// Delete every record flagged resolved-remote.
    ///
    /// This is lossy: the value the record had before the merge is not kept
    /// anywhere, so the record is removed rather than restored. Returns the
    /// number of records removed.
    pub fn accept_local(&mut self) -> Result<usize> {
        let before = self.quotes.len();
        let next = self
            .quotes
            .iter()
            .filter(|quote| !quote.resolved_remote)
            .cloned()
            .collect::<Vec<_>>();
        let removed = before - next.len();
        if removed > 0 {
            self.commit(next)?;
            tracing::warn!("Removed {removed} quotes resolved in favor of remote");
        }
        Ok(removed)
    }

    /// Record the remote id assigned to a quote. Returns `false` if the quote
    /// is no longer present.
    pub fn assign_server_id(&mut self, id: &QuoteId, server_id: i64) -> Result<bool> {
        let Some(position) = self.quotes.iter().position(|quote| &quote.id == id) else {
            return Ok(false);
        };
        if self.quotes[position].server_id == Some(server_id) {
            return Ok(true);
        }

        let mut next = self.quotes.clone();
        next[position].server_id = Some(server_id);
        self.commit(next)?;
        Ok(true)
    }

    pub fn get(&self, id: &QuoteId) -> Option<&Quote> {
        self.quotes.iter().find(|quote| &quote.id == id)
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Records currently flagged resolved-remote
    pub fn flagged(&self) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|quote| quote.resolved_remote)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    /// Time of the last successful merge (Unix ms)
    pub const fn last_synced_at(&self) -> Option<i64> {
        self.last_synced_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryKeyValueStore, SqliteKeyValueStore};
    use crate::sync::identity_key;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn empty_store() -> (QuoteStore, MemoryKeyValueStore) {
        let storage = MemoryKeyValueStore::new();
        let store = QuoteStore::with_quotes(storage.clone(), Vec::new()).unwrap();
        (store, storage)
    }

    fn persisted(storage: &MemoryKeyValueStore) -> Vec<Quote> {
        let raw = storage.load(QUOTES_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn open_without_data_uses_defaults() {
        let store = QuoteStore::open(MemoryKeyValueStore::new()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.selected_category(), ALL_CATEGORIES);
    }

    #[test]
    fn open_with_malformed_data_uses_defaults() {
        let storage = MemoryKeyValueStore::with_entries([(QUOTES_KEY, "{not json")]);
        let store = QuoteStore::open(storage).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn open_restores_selected_category() {
        let storage = MemoryKeyValueStore::with_entries([
            (QUOTES_KEY, "[]"),
            (SELECTED_CATEGORY_KEY, "Life"),
        ]);
        let store = QuoteStore::open(storage).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.selected_category(), "Life");
    }

    #[test]
    fn add_appends_and_persists() {
        let (mut store, storage) = empty_store();

        let quote = store.add("  Keep going  ", " Motivation ").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(quote.text, "Keep going");
        assert_eq!(quote.category, "Motivation");
        assert_eq!(store.get(&quote.id), Some(&quote));
        assert_eq!(persisted(&storage), store.quotes().to_vec());
    }

    #[test]
    fn add_rejects_missing_fields() {
        let (mut store, _) = empty_store();

        assert!(matches!(store.add("", "x"), Err(Error::MissingField("text"))));
        assert!(matches!(
            store.add("x", "   "),
            Err(Error::MissingField("category"))
        ));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn filter_by_category_selects_exact_matches() {
        let (mut store, storage) = empty_store();
        store.add("a", "Life").unwrap();
        store.add("b", "Work").unwrap();
        store.add("c", "Life").unwrap();

        let all = store.filter_by_category(Some(ALL_CATEGORIES)).unwrap();
        assert_eq!(all.len(), 3);
        let none = store.filter_by_category(None).unwrap();
        assert_eq!(none.len(), 3);

        let life = store.filter_by_category(Some("Life")).unwrap();
        let texts = life.iter().map(|quote| quote.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["a", "c"]);
        assert!(store.filter_by_category(Some("life")).unwrap().is_empty());

        store.filter_by_category(Some("Work")).unwrap();
        assert_eq!(store.selected_category(), "Work");
        assert_eq!(
            storage.load(SELECTED_CATEGORY_KEY).unwrap().as_deref(),
            Some("Work")
        );
        assert_eq!(store.filtered().len(), 1);
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let (mut store, _) = empty_store();
        store.add("a", "Life").unwrap();
        store.add("b", "Work").unwrap();
        store.add("c", "Life").unwrap();

        assert_eq!(store.categories(), vec!["All", "Life", "Work"]);
    }

    #[test]
    fn pick_random_on_empty_sequence_is_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty: Vec<Quote> = Vec::new();
        assert!(pick_random(&empty, &mut rng).is_none());
    }

    #[test]
    fn pick_random_is_reproducible_with_seed() {
        let items = (0..10).collect::<Vec<_>>();
        let first = pick_random(&items, &mut StdRng::seed_from_u64(42)).copied();
        let second = pick_random(&items, &mut StdRng::seed_from_u64(42)).copied();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn random_quote_respects_selection() {
        let (mut store, _) = empty_store();
        store.add("a", "Life").unwrap();
        store.add("b", "Work").unwrap();
        store.filter_by_category(Some("Work")).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(store.random_quote(&mut rng).unwrap().text, "b");
        }

        store.filter_by_category(Some("Missing")).unwrap();
        assert!(store.random_quote(&mut rng).is_none());
    }

    #[test]
    fn import_is_idempotent() {
        let (mut store, _) = empty_store();
        let payload = json!([
            {"text": "one", "category": "A"},
            {"text": "two", "category": "B"}
        ]);

        assert_eq!(store.import_quotes(&payload).unwrap(), 2);
        assert_eq!(store.import_quotes(&payload).unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn import_skips_existing_text_and_keeps_order() {
        let (mut store, storage) = empty_store();
        store.add("existing", "A").unwrap();

        let payload = json!([
            {"text": "new one", "category": "B"},
            {"text": "existing", "category": "Other"},
            {"text": "", "category": "B"},
            {"text": "new two", "category": "C"},
            {"text": "new one", "category": "D"}
        ]);

        assert_eq!(store.import_quotes(&payload).unwrap(), 2);
        let texts = store
            .quotes()
            .iter()
            .map(|quote| quote.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["existing", "new one", "new two"]);
        assert_eq!(persisted(&storage), store.quotes().to_vec());
    }

    #[test]
    fn import_trims_fields_before_matching() {
        let (mut store, _) = empty_store();
        store.add("x", "Life").unwrap();

        let accepted = store
            .import_quotes(&json!([
                {"text": "x ", "category": "Life"},
                {"text": " y", "category": " Work "}
            ]))
            .unwrap();

        assert_eq!(accepted, 1);
        assert_eq!(store.quotes()[1].text, "y");
        let work = store.filter_by_category(Some("Work")).unwrap();
        assert_eq!(work.len(), 1);
    }

    #[test]
    fn import_rejects_non_list_payload() {
        let (mut store, _) = empty_store();
        store.add("a", "b").unwrap();

        assert!(matches!(
            store.import_quotes(&json!({"text": "x", "category": "y"})),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.import_json("not json"),
            Err(Error::Serialization(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn export_then_import_round_trips() {
        let (mut source, _) = empty_store();
        source.add("first", "A").unwrap();
        source.add("second", "B").unwrap();
        source
            .merge_remote(&[RemoteQuote::new(Some(3), "third", "Server")], identity_key)
            .unwrap();

        let snapshot = source.export_snapshot().unwrap();
        let (mut target, _) = empty_store();
        let imported = target.import_json(&snapshot).unwrap();

        assert_eq!(imported, 3);
        assert_eq!(target.quotes(), source.quotes());
    }

    #[test]
    fn export_does_not_mutate() {
        let (mut store, _) = empty_store();
        store.add("a", "b").unwrap();
        let before = store.quotes().to_vec();

        let snapshot = store.export_snapshot().unwrap();

        assert!(snapshot.starts_with("[\n"));
        assert_eq!(store.quotes(), before.as_slice());
    }

    #[test]
    fn merge_appends_unmatched_remote_record() {
        let (mut store, storage) = empty_store();
        store.add("A", "X").unwrap();

        let report = store
            .merge_remote(&[RemoteQuote::new(Some(1), "B", "Y")], identity_key)
            .unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.flagged().is_empty());
        assert!(report.resolved.is_empty());
        assert!(store.last_synced_at().is_some());
        assert_eq!(persisted(&storage), store.quotes().to_vec());
    }

    #[test]
    fn last_sync_time_survives_reopen() {
        let (mut store, storage) = empty_store();
        assert_eq!(store.last_synced_at(), None);

        store
            .merge_remote(&[RemoteQuote::new(Some(1), "B", "Y")], identity_key)
            .unwrap();
        let synced_at = store.last_synced_at();
        assert!(synced_at.is_some());

        let reopened = QuoteStore::open(storage).unwrap();
        assert_eq!(reopened.last_synced_at(), synced_at);
    }

    #[test]
    fn merge_overwrites_matched_record() {
        let mut local = Quote::new("old", "X");
        local.server_id = Some(1);
        let local_id = local.id;
        let mut store = QuoteStore::with_quotes(MemoryKeyValueStore::new(), vec![local]).unwrap();

        let report = store
            .merge_remote(&[RemoteQuote::new(Some(1), "new", "X")], identity_key)
            .unwrap();

        let merged = store.get(&local_id).unwrap();
        assert_eq!(merged.text, "new");
        assert!(merged.resolved_remote);
        assert_eq!(report.resolved, vec![local_id]);
    }

    #[test]
    fn accept_remote_clears_flags_only() {
        let mut local = Quote::new("old", "X");
        local.server_id = Some(1);
        let mut store = QuoteStore::with_quotes(MemoryKeyValueStore::new(), vec![local]).unwrap();
        store
            .merge_remote(&[RemoteQuote::new(Some(1), "new", "X")], identity_key)
            .unwrap();

        assert_eq!(store.accept_remote().unwrap(), 1);
        assert_eq!(store.accept_remote().unwrap(), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.quotes()[0].text, "new");
        assert!(store.flagged().is_empty());
    }

    #[test]
    fn accept_local_removes_flagged_records() {
        let mut local = Quote::new("old", "X");
        local.server_id = Some(1);
        let keep = Quote::new("untouched", "Y");
        let mut store =
            QuoteStore::with_quotes(MemoryKeyValueStore::new(), vec![local, keep]).unwrap();
        store
            .merge_remote(&[RemoteQuote::new(Some(1), "new", "X")], identity_key)
            .unwrap();

        assert_eq!(store.accept_local().unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.quotes()[0].text, "untouched");
    }

    #[test]
    fn assign_server_id_updates_record() {
        let (mut store, storage) = empty_store();
        let quote = store.add("a", "b").unwrap();

        assert!(store.assign_server_id(&quote.id, 101).unwrap());
        assert_eq!(store.get(&quote.id).unwrap().server_id, Some(101));
        assert_eq!(persisted(&storage)[0].server_id, Some(101));
        assert!(!store.assign_server_id(&QuoteId::new(), 5).unwrap());
    }

    #[test]
    fn sqlite_storage_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("quotes.db");

        let added = {
            let mut store = QuoteStore::open(SqliteKeyValueStore::open(&path).unwrap()).unwrap();
            store.filter_by_category(Some("Life")).unwrap();
            store.add("Persisted", "Life").unwrap()
        };

        let store = QuoteStore::open(SqliteKeyValueStore::open(&path).unwrap()).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(&added.id), Some(&added));
        assert_eq!(store.selected_category(), "Life");
    }
}
