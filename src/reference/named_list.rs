//! Named-List Reference Store
//!
//! CRUD + rename for one reference list, persisted as a whole-list snapshot on
//! every mutation. Persistence faults are logged by the store adapter and never
//! returned; the in-memory change always stands.

use crate::domain::ReferenceItem;
use crate::grid::EditSession;
use crate::screens::Notices;
use crate::storage::{Lookup, PersistentStore};
use super::domains::{ReferenceDomain, HEADER_UPDATED};

/// Number of items seeded into a never-initialized list
pub const SEED_COUNT: u32 = 3;

/// Live state of one reference list
pub struct NamedListStore {
    domain: &'static ReferenceDomain,
    store: PersistentStore,
    items: Vec<ReferenceItem>,
    column_title: String,
    item_edit: EditSession<String>,
    header_edit: EditSession<()>,
    notices: Notices,
}

impl NamedListStore {
    /// Load the list, seeding and persisting three items on first use
    pub fn load(domain: &'static ReferenceDomain, store: PersistentStore) -> Self {
        let items = match store.lookup::<Vec<ReferenceItem>>(domain.items_key) {
            Lookup::Found(items) => items,
            Lookup::Missing => {
                let seeded: Vec<ReferenceItem> = (1..=SEED_COUNT)
                    .map(|id| ReferenceItem::numbered(domain.item_label, id))
                    .collect();
                store.set(domain.items_key, &seeded);
                log::info!("Seeded reference list '{}'", domain.key);
                seeded
            }
            // Keep the stored bytes; an empty list is shown until the next edit
            Lookup::Unreadable => Vec::new(),
        };

        let column_title = store
            .get_text(domain.header_key)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| domain.default_header.to_string());

        Self {
            domain,
            store,
            items,
            column_title,
            item_edit: EditSession::new(),
            header_edit: EditSession::new(),
            notices: Notices::default(),
        }
    }

    pub fn domain(&self) -> &'static ReferenceDomain {
        self.domain
    }

    pub fn items(&self) -> &[ReferenceItem] {
        &self.items
    }

    /// Items with their 1-based display position
    pub fn rows(&self) -> impl Iterator<Item = (usize, &ReferenceItem)> {
        self.items.iter().enumerate().map(|(index, item)| (index + 1, item))
    }

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.name.clone()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&ReferenceItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn column_title(&self) -> &str {
        &self.column_title
    }

    /// Success messages queued by mutations
    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Rename an item; blank names are ignored
    pub fn rename(&mut self, key: &str, new_name: &str) -> bool {
        let name = new_name.trim();
        if name.is_empty() {
            return false;
        }

        let Some(item) = self.items.iter_mut().find(|item| item.key == key) else {
            return false;
        };
        item.name = name.to_string();
        self.persist();
        self.notices.success(self.domain.messages.updated);
        true
    }

    /// Append `"<label> <max id + 1>"`
    ///
    /// Ids of deleted items can come back: only present items are considered.
    /// Nothing is added once the largest id is `u32::MAX`.
    pub fn add(&mut self) -> Option<&ReferenceItem> {
        let max_id = self.items.iter().map(|item| item.id).max().unwrap_or(0);
        let Some(new_id) = max_id.checked_add(1) else {
            log::warn!("Reference list '{}' has no free id after {}", self.domain.key, max_id);
            return None;
        };
        self.items.push(ReferenceItem::numbered(self.domain.item_label, new_id));
        self.persist();
        self.notices.success(self.domain.messages.added);
        self.items.last()
    }

    pub fn delete(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key != key);
        if self.items.len() == before {
            return false;
        }
        if self.item_edit.is_editing(&key.to_string()) {
            self.item_edit.cancel();
        }
        self.persist();
        self.notices.success(self.domain.messages.deleted);
        true
    }

    /// Rename the list's column header; blank titles are ignored
    pub fn rename_column_header(&mut self, new_title: &str) -> bool {
        let title = new_title.trim();
        if title.is_empty() {
            return false;
        }
        self.column_title = title.to_string();
        self.store.set_text(self.domain.header_key, title);
        self.notices.success(HEADER_UPDATED);
        true
    }

    // ========================
    // Edit sessions
    // ========================

    pub fn start_edit(&mut self, key: &str) -> bool {
        let Some(name) = self.get(key).map(|item| item.name.clone()) else {
            return false;
        };
        self.item_edit.begin(key.to_string(), &name);
        true
    }

    pub fn editing_key(&self) -> Option<&str> {
        self.item_edit.target().map(String::as_str)
    }

    pub fn edit_buffer(&self) -> &str {
        self.item_edit.buffer()
    }

    pub fn set_edit_buffer(&mut self, value: impl Into<String>) {
        self.item_edit.set_buffer(value);
    }

    /// Save the open item edit; a blank buffer keeps the session open
    pub fn save_edit(&mut self) -> bool {
        if self.item_edit.buffer().trim().is_empty() {
            return false;
        }
        match self.item_edit.commit() {
            Some((key, name)) => self.rename(&key, &name),
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.item_edit.cancel();
    }

    pub fn start_header_edit(&mut self) {
        let current = self.column_title.clone();
        self.header_edit.begin((), &current);
    }

    pub fn is_editing_header(&self) -> bool {
        self.header_edit.is_active()
    }

    pub fn set_header_buffer(&mut self, value: impl Into<String>) {
        self.header_edit.set_buffer(value);
    }

    /// Save the open header edit; a blank buffer keeps the session open
    pub fn save_header_edit(&mut self) -> bool {
        if self.header_edit.buffer().trim().is_empty() {
            return false;
        }
        match self.header_edit.commit() {
            Some(((), title)) => self.rename_column_header(&title),
            None => false,
        }
    }

    pub fn cancel_header_edit(&mut self) {
        self.header_edit.cancel();
    }

    fn persist(&self) {
        self.store.set(self.domain.items_key, &self.items);
    }
}

/// Current names of a list straight from the store, without seeding
///
/// Used by grid editors at edit time; missing or corrupt lists give no options.
pub fn stored_names(store: &PersistentStore, domain: &ReferenceDomain) -> Vec<String> {
    store
        .get::<Vec<ReferenceItem>>(domain.items_key, Vec::new())
        .into_iter()
        .map(|item| item.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::reference::domains::{ALL_DOMAINS, INITIATORS, STAGES, TAGS};
    use crate::storage::{KeyValueBackend, MemoryBackend};

    #[test]
    fn test_fresh_initiators_are_seeded_and_persisted() {
        let store = PersistentStore::in_memory();
        let list = NamedListStore::load(&INITIATORS, store.clone());

        let names: Vec<&str> = list.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Инициатор 1", "Инициатор 2", "Инициатор 3"]);
        let ids: Vec<u32> = list.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let stored: Vec<ReferenceItem> = store.get("initiators", Vec::new());
        assert_eq!(stored, list.items());
        assert_eq!(list.column_title(), "Наименование инициатора");
    }

    #[test]
    fn test_add_then_reload_round_trips() {
        let store = PersistentStore::in_memory();
        for domain in ALL_DOMAINS.iter().copied() {
            let mut list = NamedListStore::load(domain, store.clone());
            let added = list.add().unwrap().clone();
            assert_eq!(added.id, 4);
            assert_eq!(added.name, format!("{} 4", domain.item_label));

            let reloaded = NamedListStore::load(domain, store.clone());
            assert_eq!(reloaded.items().last(), Some(&added));
        }
    }

    #[test]
    fn test_blank_rename_is_ignored() {
        let store = PersistentStore::in_memory();
        let mut list = NamedListStore::load(&STAGES, store.clone());

        assert!(!list.rename("1", ""));
        assert!(!list.rename("1", "   \t"));
        assert_eq!(list.get("1").unwrap().name, "Этап 1");

        assert!(list.rename("1", "  Проектирование  "));
        let reloaded = NamedListStore::load(&STAGES, store);
        assert_eq!(reloaded.get("1").unwrap().name, "Проектирование");
    }

    #[test]
    fn test_deleted_id_is_reused() {
        let store = PersistentStore::in_memory();
        let mut list = NamedListStore::load(&TAGS, store);

        assert!(list.delete("3"));
        let added = list.add().unwrap().clone();
        assert_eq!(added.id, 3);
        assert_eq!(added.key, "3");

        // Display position follows array order, not id
        assert!(list.delete("1"));
        let positions: Vec<(usize, u32)> = list.rows().map(|(pos, item)| (pos, item.id)).collect();
        assert_eq!(positions, vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn test_column_header_rename() {
        let store = PersistentStore::in_memory();
        let mut list = NamedListStore::load(&TAGS, store.clone());

        assert!(!list.rename_column_header("  "));
        assert!(list.rename_column_header(" Метка "));
        assert_eq!(store.get_text("tagsColumnTitle"), Some("Метка".to_string()));

        let reloaded = NamedListStore::load(&TAGS, store);
        assert_eq!(reloaded.column_title(), "Метка");
    }

    #[test]
    fn test_edit_session_save_and_cancel() {
        let store = PersistentStore::in_memory();
        let mut list = NamedListStore::load(&TAGS, store);

        assert!(list.start_edit("2"));
        assert_eq!(list.edit_buffer(), "Тэг 2");
        list.set_edit_buffer("   ");
        assert!(!list.save_edit());
        assert_eq!(list.editing_key(), Some("2"));

        list.set_edit_buffer("Срочно");
        assert!(list.save_edit());
        assert_eq!(list.editing_key(), None);
        assert_eq!(list.get("2").unwrap().name, "Срочно");

        list.start_edit("1");
        list.set_edit_buffer("discarded");
        list.cancel_edit();
        assert_eq!(list.get("1").unwrap().name, "Тэг 1");

        list.start_header_edit();
        list.set_header_buffer("Тэг");
        assert!(list.save_header_edit());
        assert!(!list.is_editing_header());
        assert_eq!(list.column_title(), "Тэг");
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let backend = Arc::new(MemoryBackend::with_quota(200));
        let store = PersistentStore::new(backend.clone());
        let mut list = NamedListStore::load(&TAGS, store);

        for _ in 0..10 {
            list.add();
        }
        assert_eq!(list.items().len(), 13);

        // Later writes hit the quota; the stored copy lags behind memory
        let stored: Vec<ReferenceItem> =
            serde_json::from_str(&backend.read("tags").unwrap().unwrap()).unwrap();
        assert!(stored.len() >= 3 && stored.len() < 13);
        assert_eq!(stored[..], list.items()[..stored.len()]);
    }

    #[test]
    fn test_corrupt_list_is_not_reseeded() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("statuses", "{oops").unwrap();
        let store = PersistentStore::new(backend.clone());

        let list = NamedListStore::load(&crate::reference::domains::STATUSES, store);
        assert!(list.items().is_empty());
        assert_eq!(backend.read("statuses").unwrap(), Some("{oops".to_string()));
    }

    #[test]
    fn test_add_stops_at_largest_id() {
        let store = PersistentStore::in_memory();
        store.set("stages", &vec![ReferenceItem::new(u32::MAX, "Последний".to_string())]);
        let mut list = NamedListStore::load(&STAGES, store.clone());

        assert!(list.add().is_none());
        assert_eq!(list.items().len(), 1);
        assert!(list.notices().is_empty());
        assert_eq!(NamedListStore::load(&STAGES, store).items().len(), 1);
    }

    #[test]
    fn test_mutations_queue_success_notices() {
        use crate::screens::NoticeLevel;

        let store = PersistentStore::in_memory();
        let mut list = NamedListStore::load(&crate::reference::domains::STATUSES, store);
        assert!(list.notices().is_empty());

        list.add();
        list.rename("1", "В работе");
        list.delete("2");
        list.rename_column_header("Статус");
        // Ignored edits stay silent
        list.rename("1", "  ");
        list.delete("missing");

        let messages: Vec<String> = list
            .notices()
            .drain()
            .into_iter()
            .inspect(|n| assert_eq!(n.level, NoticeLevel::Success))
            .map(|n| n.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Новый статус добавлен",
                "Статус обновлен",
                "Статус удален",
                "Заголовок столбца обновлен",
            ]
        );
    }

    #[test]
    fn test_stored_names_does_not_seed() {
        let store = PersistentStore::in_memory();
        assert!(stored_names(&store, &TAGS).is_empty());

        NamedListStore::load(&TAGS, store.clone());
        assert_eq!(stored_names(&store, &TAGS), vec!["Тэг 1", "Тэг 2", "Тэг 3"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Delete(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Add), (0usize..8).prop_map(Op::Delete)]
    }

    proptest! {
        #[test]
        fn prop_keys_match_replay_model(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let store = PersistentStore::in_memory();
            let mut list = NamedListStore::load(&TAGS, store.clone());
            let mut model: Vec<u32> = vec![1, 2, 3];

            for op in ops {
                match op {
                    Op::Add => {
                        let next = model.iter().copied().max().unwrap_or(0) + 1;
                        model.push(next);
                        list.add();
                    }
                    Op::Delete(index) => {
                        if model.is_empty() {
                            continue;
                        }
                        let id = model.remove(index % model.len());
                        prop_assert!(list.delete(&id.to_string()));
                    }
                }
            }

            let expected: BTreeSet<String> = model.iter().map(|id| id.to_string()).collect();
            let actual: BTreeSet<String> = list.items().iter().map(|i| i.key.clone()).collect();
            prop_assert_eq!(&actual, &expected);

            let reloaded = NamedListStore::load(&TAGS, store);
            let stored: BTreeSet<String> = reloaded.items().iter().map(|i| i.key.clone()).collect();
            prop_assert_eq!(stored, expected);
        }
    }
}
