use std::collections::HashMap;

use tracing::trace;

use crate::entities::{Contact, LEAD_STATUSES, Lead};

/// Small string key-value store holding user edits.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str) -> Option<String>;
}

/// Process local store, forgotten on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        trace!("store: {key} = {value:?}");
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

fn status_key(id: &str) -> String {
    format!("leadStatuses/{id}")
}

fn notes_key(id: &str) -> String {
    format!("leadNotes/{id}")
}

fn activity_key(id: &str) -> String {
    format!("leadActivity/{id}")
}

fn activity_date_key(id: &str) -> String {
    format!("leadActivityDate/{id}")
}

/// Edits made to leads, layered over the generated data.
pub struct LeadEdits<'a> {
    store: &'a mut dyn KeyValueStore,
}

impl<'a> LeadEdits<'a> {
    pub fn new(store: &'a mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn set_status(&mut self, lead: &Lead, status: &str) {
        self.store.set(&status_key(lead.id()), status.to_string());
    }

    /// Moves the lead to the status after its current one and returns it.
    pub fn cycle_status(&mut self, lead: &Lead) -> String {
        let current = apply(&*self.store, lead).entry.status;
        let next = match LEAD_STATUSES.iter().position(|s| *s == current) {
            Some(idx) => LEAD_STATUSES[(idx + 1) % LEAD_STATUSES.len()],
            None => LEAD_STATUSES[0],
        };
        self.set_status(lead, next);
        next.to_string()
    }

    pub fn set_notes(&mut self, lead: &Lead, notes: &str) {
        self.store.set(&notes_key(lead.id()), notes.to_string());
    }

    pub fn log_call(&mut self, lead: &Lead, notes: &str, date: &str) {
        self.store.set(&activity_key(lead.id()), "Call".to_string());
        self.store.set(&activity_date_key(lead.id()), date.to_string());
        self.set_notes(lead, notes);
    }
}

/// The lead as the user last left it.
pub fn apply(store: &dyn KeyValueStore, lead: &Lead) -> Lead {
    let mut lead = lead.clone();
    let id = lead.id().to_string();
    if let Some(status) = store.get(&status_key(&id)) {
        lead.entry.status = status;
    }
    if let Some(notes) = store.get(&notes_key(&id)) {
        lead.notes = notes;
    }
    if let Some(activity) = store.get(&activity_key(&id)) {
        lead.last_activity = activity;
    }
    if let Some(date) = store.get(&activity_date_key(&id)) {
        lead.last_activity_date = date;
    }
    lead
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockData;

    fn lead() -> Lead {
        MockData::new(chrono::Local::now(), 1).leads().remove(0)
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::default();
        assert_eq!(store.get("a"), None);
        store.set("a", "1".into());
        assert_eq!(store.get("a"), Some("1".into()));
        assert_eq!(store.remove("a"), Some("1".into()));
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn status_cycles_and_wraps() {
        let mut store = MemoryStore::default();
        let lead = lead();
        assert_eq!(lead.status(), "New");
        let mut edits = LeadEdits::new(&mut store);
        assert_eq!(edits.cycle_status(&lead), "Contacted");
        for _ in 0..4 {
            edits.cycle_status(&lead);
        }
        assert_eq!(edits.cycle_status(&lead), "New");
        assert_eq!(lead.status(), "New");
    }

    #[test]
    fn logged_call_overrides_activity() {
        let mut store = MemoryStore::default();
        let lead = lead();
        LeadEdits::new(&mut store).log_call(&lead, "Left voicemail", "1/2/2026");
        let edited = apply(&store, &lead);
        assert_eq!(edited.last_activity, "Call");
        assert_eq!(edited.last_activity_date, "1/2/2026");
        assert_eq!(edited.notes, "Left voicemail");
        assert_eq!(edited.entry.company, lead.entry.company);
    }

    #[test]
    fn untouched_leads_are_unchanged() {
        let store = MemoryStore::default();
        let lead = lead();
        assert_eq!(apply(&store, &lead), lead);
    }
}
