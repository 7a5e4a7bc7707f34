use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Key-value + pub/sub boundary to the shared task-state backend. The real
/// store lives outside this process; `MemoryStore` stands in for it when the
/// worker runs standalone and in tests.
///
/// Both operations are best-effort: at most one worker owns a job, so a lost
/// notification only delays an observer, it cannot corrupt state.
pub trait StateStore: Send + Sync {
    /// Merge the given fields into the record under `key`. Fields not named
    /// are left untouched.
    fn hset(&self, key: &str, fields: &BTreeMap<String, String>);
    fn publish(&self, channel: &str, payload: &str);
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, BTreeMap<String, String>>>,
    published: Mutex<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.records.lock().ok()?.get(key).cloned()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl StateStore for MemoryStore {
    fn hset(&self, key: &str, fields: &BTreeMap<String, String>) {
        if let Ok(mut records) = self.records.lock() {
            records
                .entry(key.to_string())
                .or_default()
                .extend(fields.clone());
        }
    }

    fn publish(&self, channel: &str, payload: &str) {
        if let Ok(mut published) = self.published.lock() {
            published.push((channel.to_string(), payload.to_string()));
        }
    }
}

/// Writes job fields into the store and broadcasts the same fields on the
/// job's progress channel, all values serialized as strings.
#[derive(Clone)]
pub struct StateReporter {
    store: Arc<dyn StateStore>,
    channel_prefix: String,
}

impl StateReporter {
    pub fn new(store: Arc<dyn StateStore>, channel_prefix: &str) -> Self {
        Self {
            store,
            channel_prefix: channel_prefix.to_string(),
        }
    }

    pub fn report<I, V>(&self, task_id: &str, fields: I)
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: Into<String>,
    {
        let fields: BTreeMap<String, String> = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect();

        debug!("state {} <- {:?}", task_id, fields);
        self.store.hset(task_id, &fields);

        let channel = format!("{}:{}", self.channel_prefix, task_id);
        let payload = serde_json::to_string(&fields).unwrap_or_else(|_| "{}".to_string());
        self.store.publish(&channel, &payload);
    }

    pub fn progress(&self, task_id: &str, pct: u32) {
        self.report(task_id, [("progress", pct.to_string())]);
    }

    pub fn failed(&self, task_id: &str, error: &str) {
        self.report(
            task_id,
            [("status", "failed".to_string()), ("error", error.to_string())],
        );
    }
}
