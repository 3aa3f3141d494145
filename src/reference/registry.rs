//! Reference Registry
//!
//! Catalog of reference lists. Built-in descriptors are re-seeded on every
//! load, except those whose key sits in the tombstone set.

use std::collections::HashSet;

use crate::domain::ReferenceDescriptor;
use crate::storage::keys::{DELETED_REFERENCE_TYPES, REFERENCE_TYPES};
use crate::storage::PersistentStore;
use super::domains::{default_descriptors, find_domain};
use super::named_list::NamedListStore;

/// Maximum length of a derived key, in characters
pub const MAX_KEY_CHARS: usize = 20;

/// Millisecond clock used for key fallbacks and collision suffixes
pub type Clock = fn() -> i64;

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// What opening a registry entry leads to
pub enum ReferencePage {
    /// Built-in list with its store
    List(NamedListStore),
    /// Custom descriptor with no list behind it yet
    Placeholder(ReferenceDescriptor),
    NotFound,
}

pub struct ReferenceRegistry {
    store: PersistentStore,
    descriptors: Vec<ReferenceDescriptor>,
    deleted: Vec<String>,
    clock: Clock,
}

impl ReferenceRegistry {
    /// Load, reconcile against the built-in defaults, persist
    pub fn load(store: PersistentStore) -> Self {
        Self::load_with(store, default_descriptors())
    }

    /// Same as `load` with a caller-supplied default set
    pub fn load_with(store: PersistentStore, defaults: Vec<ReferenceDescriptor>) -> Self {
        let deleted: Vec<String> = store.get(DELETED_REFERENCE_TYPES, Vec::new());
        let stored: Option<Vec<ReferenceDescriptor>> = store.lookup(REFERENCE_TYPES).found();

        let descriptors = reconcile(&defaults, stored, &deleted);
        store.set(REFERENCE_TYPES, &descriptors);
        log::info!(
            "Reference registry loaded: {} active, {} deleted",
            descriptors.len(),
            deleted.len()
        );

        Self {
            store,
            descriptors,
            deleted,
            clock: system_clock,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn descriptors(&self) -> &[ReferenceDescriptor] {
        &self.descriptors
    }

    pub fn deleted_keys(&self) -> &[String] {
        &self.deleted
    }

    pub fn get(&self, key: &str) -> Option<&ReferenceDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    /// Change a descriptor's title; blank titles are ignored
    pub fn rename(&mut self, key: &str, new_title: &str) -> bool {
        let title = new_title.trim();
        if title.is_empty() {
            return false;
        }

        let Some(descriptor) = self.descriptors.iter_mut().find(|d| d.key == key) else {
            return false;
        };
        descriptor.title = title.to_string();
        self.persist_descriptors();
        true
    }

    /// Register a new reference type under a key derived from its title
    pub fn add(&mut self, title: &str, description: &str) -> Option<&ReferenceDescriptor> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let taken: HashSet<&str> = self
            .descriptors
            .iter()
            .map(|d| d.key.as_str())
            .chain(self.deleted.iter().map(String::as_str))
            .collect();
        let key = derive_key(title, |k| taken.contains(k), (self.clock)());

        self.descriptors
            .push(ReferenceDescriptor::new(key, title, description.trim()));
        self.persist_descriptors();
        self.descriptors.last()
    }

    /// Remove a descriptor and tombstone its key for good
    pub fn delete(&mut self, key: &str) -> bool {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.key != key);
        if self.descriptors.len() == before {
            return false;
        }

        if !self.deleted.iter().any(|k| k == key) {
            self.deleted.push(key.to_string());
        }
        self.persist_descriptors();
        self.store.set(DELETED_REFERENCE_TYPES, &self.deleted);
        log::info!("Reference type '{}' deleted", key);
        true
    }

    /// Resolve an active descriptor to its page
    pub fn open(&self, key: &str) -> ReferencePage {
        let Some(descriptor) = self.get(key) else {
            return ReferencePage::NotFound;
        };
        match find_domain(key) {
            Some(domain) => ReferencePage::List(NamedListStore::load(domain, self.store.clone())),
            None => ReferencePage::Placeholder(descriptor.clone()),
        }
    }

    fn persist_descriptors(&self) {
        self.store.set(REFERENCE_TYPES, &self.descriptors);
    }
}

/// Merge stored descriptors with the defaults
///
/// Available defaults come first in default order, keeping only a stored title.
/// Stored descriptors that are neither default nor tombstoned follow in stored
/// order.
pub fn reconcile(
    defaults: &[ReferenceDescriptor],
    stored: Option<Vec<ReferenceDescriptor>>,
    deleted: &[String],
) -> Vec<ReferenceDescriptor> {
    let is_deleted = |key: &str| deleted.iter().any(|k| k == key);

    let available = defaults.iter().filter(|d| !is_deleted(&d.key));
    let Some(stored) = stored else {
        return available.cloned().collect();
    };

    let mut result: Vec<ReferenceDescriptor> = available
        .map(|default| match stored.iter().find(|s| s.key == default.key) {
            Some(saved) => ReferenceDescriptor {
                title: saved.title.clone(),
                ..default.clone()
            },
            None => default.clone(),
        })
        .collect();

    let custom = stored
        .into_iter()
        .filter(|s| !is_deleted(&s.key) && !defaults.iter().any(|d| d.key == s.key));
    result.extend(custom);
    result
}

/// Derive a registry key from a title
///
/// Lowercase, whitespace runs become `_`, non-word characters are dropped, and
/// the result is cut to [`MAX_KEY_CHARS`]. An empty slug falls back to
/// `ref_<now>`; a taken slug gets a `_<now>` suffix. A taken fallback or
/// suffixed key is bumped with `_2`, `_3`, ... until it is free.
pub fn derive_key(title: &str, is_taken: impl Fn(&str) -> bool, now: i64) -> String {
    let slug = slugify(title);
    let base = if slug.is_empty() {
        format!("ref_{}", now)
    } else if is_taken(&slug) {
        format!("{}_{}", slug, now)
    } else {
        return slug;
    };

    if !is_taken(&base) {
        return base;
    }
    (2u64..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or(base)
}

fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut in_whitespace = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_alphanumeric() || c == '_' {
            slug.push(c);
        }
    }

    slug.chars().take(MAX_KEY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{KeyValueBackend, MemoryBackend};

    fn fixed_clock() -> i64 {
        1_700_000_000_000
    }

    fn store() -> (Arc<MemoryBackend>, PersistentStore) {
        let backend = Arc::new(MemoryBackend::new());
        (backend.clone(), PersistentStore::new(backend))
    }

    #[test]
    fn test_first_load_persists_defaults() {
        let (backend, store) = store();
        let registry = ReferenceRegistry::load(store);

        let keys: Vec<&str> = registry.descriptors().iter().map(|d| d.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["tags", "calculation_types", "documents", "statuses", "stages", "initiators"]
        );
        assert!(backend.read("referenceTypes").unwrap().is_some());
        assert!(registry.deleted_keys().is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (backend, store) = store();
        let mut registry = ReferenceRegistry::load(store.clone()).with_clock(fixed_clock);
        registry.rename("stages", "Фазы");
        registry.add("Риски проекта", "Реестр рисков");
        registry.delete("documents");

        ReferenceRegistry::load(store.clone());
        let first = backend.read("referenceTypes").unwrap();
        ReferenceRegistry::load(store);
        let second = backend.read("referenceTypes").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_deleted_default_never_returns() {
        let (backend, store) = store();
        let mut registry = ReferenceRegistry::load(store.clone());
        assert!(registry.delete("tags"));
        assert!(!registry.delete("tags"));

        let reloaded = ReferenceRegistry::load(store);
        assert!(reloaded.get("tags").is_none());
        assert_eq!(reloaded.deleted_keys().to_vec(), vec!["tags".to_string()]);

        let raw = backend.read("deletedReferenceTypes").unwrap().unwrap();
        assert_eq!(raw, r#"["tags"]"#);
    }

    #[test]
    fn test_stored_title_survives_default_refresh() {
        let (_, store) = store();
        let stale = vec![ReferenceDescriptor::new("statuses", "Состояния", "old description")];
        store.set("referenceTypes", &stale);

        let registry = ReferenceRegistry::load(store);
        let statuses = registry.get("statuses").unwrap();
        assert_eq!(statuses.title, "Состояния");
        assert_eq!(statuses.description, "Статусы выполнения работ");
        // Defaults missing from the stored list come back
        assert_eq!(registry.descriptors().len(), 6);
    }

    #[test]
    fn test_custom_descriptors_follow_defaults() {
        let (_, store) = store();
        let stored = vec![
            ReferenceDescriptor::new("risks", "Риски", "custom"),
            ReferenceDescriptor::new("tags", "Тэги", "x"),
        ];
        store.set("referenceTypes", &stored);

        let registry = ReferenceRegistry::load(store);
        assert_eq!(registry.descriptors().len(), 7);
        assert_eq!(registry.descriptors()[6].key, "risks");
        assert_eq!(registry.descriptors()[6].description, "custom");
    }

    #[test]
    fn test_corrupt_registry_falls_back_to_defaults() {
        let (backend, store) = store();
        backend.write("referenceTypes", "not json").unwrap();

        let registry = ReferenceRegistry::load(store);
        assert_eq!(registry.descriptors().len(), 6);
        assert_ne!(backend.read("referenceTypes").unwrap().unwrap(), "not json");
    }

    #[test]
    fn test_derive_key_slug() {
        assert_eq!(derive_key("Риски   проекта!", |_| false, 1), "риски_проекта");
        assert_eq!(derive_key("Very Long Reference Type Name", |_| false, 1), "very_long_reference_");
        assert_eq!(derive_key("!!!", |_| false, 42), "ref_42");
        assert_eq!(derive_key("Tags", |k| k == "tags", 42), "tags_42");
    }

    #[test]
    fn test_add_avoids_tombstoned_keys() {
        let (_, store) = store();
        let mut registry = ReferenceRegistry::load(store).with_clock(fixed_clock);
        registry.delete("stages");

        let added = registry.add("  Stages ", "").unwrap().clone();
        assert_eq!(added.key, "stages_1700000000000");
        assert_eq!(added.title, "Stages");
        assert!(registry.add("   ", "blank").is_none());
    }

    #[test]
    fn test_add_new_reference_scenario() {
        let (_, store) = store();
        let mut registry = ReferenceRegistry::load(store.clone()).with_clock(fixed_clock);

        let added = registry.add("Риски   проекта!", "Реестр рисков").unwrap().clone();
        assert_eq!(added.key, "риски_проекта");

        let reloaded = ReferenceRegistry::load(store);
        assert_eq!(reloaded.get("риски_проекта"), Some(&added));
    }

    #[test]
    fn test_same_millisecond_adds_get_distinct_keys() {
        let (_, store) = store();
        let mut registry = ReferenceRegistry::load(store).with_clock(fixed_clock);

        let mut keys = Vec::new();
        for title in ["Риски", "Риски", "Риски", "!!!", "???"] {
            keys.push(registry.add(title, "").unwrap().key.clone());
        }
        assert_eq!(
            keys,
            vec![
                "риски",
                "риски_1700000000000",
                "риски_1700000000000_2",
                "ref_1700000000000",
                "ref_1700000000000_2",
            ]
        );

        assert!(registry.delete("риски_1700000000000"));
        assert!(registry.get("риски_1700000000000_2").is_some());
    }

    #[test]
    fn test_derive_key_skips_taken_suffixes() {
        let taken = ["tags", "tags_7", "tags_7_2"];
        assert_eq!(derive_key("Tags", |k| taken.contains(&k), 7), "tags_7_3");
        assert_eq!(derive_key("...", |k| k == "ref_7", 7), "ref_7_2");
    }

    #[test]
    fn test_rename_ignores_blank() {
        let (_, store) = store();
        let mut registry = ReferenceRegistry::load(store);
        assert!(!registry.rename("tags", "  "));
        assert!(!registry.rename("missing", "x"));
        assert!(registry.rename("tags", " Метки "));
        assert_eq!(registry.get("tags").unwrap().title, "Метки");
    }

    #[test]
    fn test_open_resolves_pages() {
        let (_, store) = store();
        let mut registry = ReferenceRegistry::load(store).with_clock(fixed_clock);
        registry.add("Риски", "");

        assert!(matches!(registry.open("initiators"), ReferencePage::List(list) if list.items().len() == 3));
        assert!(matches!(registry.open("риски"), ReferencePage::Placeholder(d) if d.title == "Риски"));
        assert!(matches!(registry.open("nope"), ReferencePage::NotFound));

        registry.delete("initiators");
        assert!(matches!(registry.open("initiators"), ReferencePage::NotFound));
    }
}
