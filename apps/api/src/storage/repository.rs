use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::models::analysis::{AnalysisHistoryEntry, CachedAnalysis};
use crate::models::client::Client;
use crate::models::creative::{FormatGroup, Language};
use crate::models::performance::PerformanceRecord;
use crate::models::user::UserAccount;
use crate::settings::DbConfig;
use crate::storage::KvStore;

const CLIENTS_KEY: &str = "clients";
const USERS_KEY: &str = "db_users";
const ANALYSIS_HISTORY_KEY: &str = "analysisHistory";
const PERFORMANCE_DATA_KEY: &str = "performanceData";
const PROCESSED_REPORTS_KEY: &str = "processedReportHashes";
const CURRENT_CLIENT_KEY: &str = "currentClientId";
const DB_CONFIG_KEY: &str = "dbConfig";
const DB_STATUS_KEY: &str = "dbStatus";
const CACHE_KEY_PREFIX: &str = "analysisCache:";

/// History never grows past this; the oldest entries are dropped first,
/// regardless of client.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Typed facade over the key/value store. The only component that knows
/// the key layout; everything else calls these methods.
///
/// Read semantics: a missing or unparsable value is logged and returned as
/// the empty default. Corrupt state degrades to "no cache, no history",
/// it never fails a request.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KvStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read_opt(key).unwrap_or_default()
    }

    fn read_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding corrupt value under '{key}': {e}");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.put(key, serde_json::to_string(value)?)
    }

    // --- clients ---

    pub fn clients(&self) -> Vec<Client> {
        self.read(CLIENTS_KEY)
    }

    pub fn set_clients(&self, clients: &[Client]) -> Result<()> {
        self.write(CLIENTS_KEY, &clients)
    }

    pub fn find_client(&self, client_id: &str) -> Option<Client> {
        self.clients().into_iter().find(|c| c.id == client_id)
    }

    // --- user accounts ---

    pub fn users(&self) -> Vec<UserAccount> {
        self.read(USERS_KEY)
    }

    pub fn set_users(&self, users: &[UserAccount]) -> Result<()> {
        self.write(USERS_KEY, &users)
    }

    /// Inserts or replaces by id, keeping list order for existing accounts.
    pub fn upsert_user(&self, user: UserAccount) -> Result<()> {
        let mut users = self.users();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
        self.set_users(&users)
    }

    // --- analysis history ---

    pub fn history(&self) -> Vec<AnalysisHistoryEntry> {
        self.read(ANALYSIS_HISTORY_KEY)
    }

    pub fn set_history(&self, entries: &[AnalysisHistoryEntry]) -> Result<()> {
        self.write(ANALYSIS_HISTORY_KEY, &entries)
    }

    /// Appends an entry, dropping the oldest entries once the cap is hit.
    /// Insertion order is recency order by construction.
    pub fn push_history_bounded(&self, entry: AnalysisHistoryEntry) -> Result<()> {
        let mut entries = self.history();
        entries.push(entry);
        if entries.len() > MAX_HISTORY_ENTRIES {
            let excess = entries.len() - MAX_HISTORY_ENTRIES;
            entries.drain(..excess);
        }
        self.set_history(&entries)
    }

    // --- analysis cache ---

    pub fn cache_key(
        hash: &str,
        client_id: &str,
        language: Language,
        format: FormatGroup,
    ) -> String {
        format!("{CACHE_KEY_PREFIX}{hash}-{client_id}-{language}-{format}")
    }

    pub fn cache_get(&self, key: &str) -> Option<CachedAnalysis> {
        self.read_opt(key)
    }

    pub fn cache_put(&self, key: &str, entry: &CachedAnalysis) -> Result<()> {
        self.write(key, entry)
    }

    // --- performance data ---

    pub fn performance_data(&self) -> HashMap<String, Vec<PerformanceRecord>> {
        self.read(PERFORMANCE_DATA_KEY)
    }

    pub fn client_rows(&self, client_id: &str) -> Vec<PerformanceRecord> {
        self.performance_data().remove(client_id).unwrap_or_default()
    }

    pub fn set_client_rows(&self, client_id: &str, rows: Vec<PerformanceRecord>) -> Result<()> {
        let mut data = self.performance_data();
        data.insert(client_id.to_string(), rows);
        self.write(PERFORMANCE_DATA_KEY, &data)
    }

    pub fn remove_client_rows(&self, client_id: &str) -> Result<()> {
        let mut data = self.performance_data();
        data.remove(client_id);
        self.write(PERFORMANCE_DATA_KEY, &data)
    }

    // --- processed report hashes ---

    pub fn processed_hashes(&self, client_id: &str) -> Vec<String> {
        self.processed_hash_map().remove(client_id).unwrap_or_default()
    }

    pub fn set_processed_hashes(&self, client_id: &str, hashes: Vec<String>) -> Result<()> {
        let mut map = self.processed_hash_map();
        map.insert(client_id.to_string(), hashes);
        self.write(PROCESSED_REPORTS_KEY, &map)
    }

    pub fn remove_processed_hashes(&self, client_id: &str) -> Result<()> {
        let mut map = self.processed_hash_map();
        map.remove(client_id);
        self.write(PROCESSED_REPORTS_KEY, &map)
    }

    fn processed_hash_map(&self) -> HashMap<String, Vec<String>> {
        self.read(PROCESSED_REPORTS_KEY)
    }

    // --- session / settings ---

    pub fn current_client_id(&self) -> Option<String> {
        self.read_opt(CURRENT_CLIENT_KEY)
    }

    pub fn set_current_client_id(&self, client_id: &str) -> Result<()> {
        self.write(CURRENT_CLIENT_KEY, &client_id)
    }

    pub fn clear_current_client_id(&self) -> Result<()> {
        self.store.remove(CURRENT_CLIENT_KEY)
    }

    pub fn db_config(&self) -> Option<DbConfig> {
        self.read_opt(DB_CONFIG_KEY)
    }

    pub fn set_db_config(&self, config: &DbConfig) -> Result<()> {
        self.write(DB_CONFIG_KEY, config)
    }

    pub fn db_status(&self) -> bool {
        self.read_opt(DB_STATUS_KEY).unwrap_or(false)
    }

    pub fn set_db_status(&self, connected: bool) -> Result<()> {
        if connected {
            self.write(DB_STATUS_KEY, &true)
        } else {
            self.store.remove(DB_STATUS_KEY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn repo() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    fn entry(n: usize) -> AnalysisHistoryEntry {
        AnalysisHistoryEntry {
            client_id: "c1".to_string(),
            filename: format!("ad{n}.mp4"),
            hash: format!("hash{n}"),
            size: 1000,
            date: Utc::now(),
            description: format!("creative {n}"),
        }
    }

    #[test]
    fn test_history_bounded_at_100() {
        let repo = repo();
        for n in 0..130 {
            repo.push_history_bounded(entry(n)).unwrap();
        }
        let history = repo.history();
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        // Oldest dropped, relative order preserved
        assert_eq!(history.first().unwrap().filename, "ad30.mp4");
        assert_eq!(history.last().unwrap().filename, "ad129.mp4");
    }

    #[test]
    fn test_upsert_user_replaces_in_place() {
        let repo = repo();
        repo.upsert_user(UserAccount { id: "u1".into(), name: "Ana".into() }).unwrap();
        repo.upsert_user(UserAccount { id: "u2".into(), name: "Luis".into() }).unwrap();
        repo.upsert_user(UserAccount { id: "u1".into(), name: "Ana María".into() }).unwrap();

        let users = repo.users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, "u1");
        assert_eq!(users[0].name, "Ana María");
        assert_eq!(users[1].name, "Luis");
    }

    #[test]
    fn test_corrupt_value_degrades_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store.put("analysisHistory", "not json".to_string()).unwrap();
        let repo = Repository::new(store);
        assert!(repo.history().is_empty());
    }

    #[test]
    fn test_cache_key_layout() {
        let key = Repository::cache_key("abc123", "c1", Language::Es, FormatGroup::Vertical);
        assert_eq!(key, "analysisCache:abc123-c1-es-VERTICAL");
    }

    #[test]
    fn test_client_rows_isolated_per_client() {
        let repo = repo();
        let row = crate::performance::report::tests::sample_record("c1", "h1", "Ad 1", "2024-01-01");
        repo.set_client_rows("c1", vec![row]).unwrap();
        assert_eq!(repo.client_rows("c1").len(), 1);
        assert!(repo.client_rows("c2").is_empty());
    }
}
