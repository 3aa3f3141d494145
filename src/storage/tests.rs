//! Storage Integration Tests
//!
//! Tests for PersistentStore over the memory and SQLite backends.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::ReferenceItem;
    use crate::error::StoreError;
    use crate::storage::{KeyValueBackend, Lookup, MemoryBackend, PersistentStore, SqliteBackend};

    fn memory_store() -> (Arc<MemoryBackend>, PersistentStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = PersistentStore::new(backend.clone());
        (backend, store)
    }

    #[test]
    fn test_get_missing_returns_default() {
        let (_, store) = memory_store();
        let value: i64 = store.get("tableScale", 100);
        assert_eq!(value, 100);
        assert_eq!(store.lookup::<i64>("tableScale"), Lookup::Missing);
    }

    #[test]
    fn test_get_corrupt_returns_default() {
        let (backend, store) = memory_store();
        backend.write("tags", "[{not json").unwrap();

        let items: Vec<ReferenceItem> = store.get("tags", Vec::new());
        assert!(items.is_empty());
        assert_eq!(store.lookup::<Vec<ReferenceItem>>("tags"), Lookup::Unreadable);
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let (backend, store) = memory_store();
        let items = vec![ReferenceItem::numbered("Тэг", 1)];
        store.set("tags", &items);

        assert_eq!(store.get::<Vec<ReferenceItem>>("tags", Vec::new()), items);
        assert_eq!(
            backend.read("tags").unwrap().unwrap(),
            r#"[{"key":"1","id":1,"name":"Тэг 1"}]"#
        );
    }

    #[test]
    fn test_text_values_are_not_json_quoted() {
        let (backend, store) = memory_store();
        store.set_text("tagsColumnTitle", "Метки");

        assert_eq!(backend.read("tagsColumnTitle").unwrap(), Some("Метки".to_string()));
        assert_eq!(store.get_text("tagsColumnTitle"), Some("Метки".to_string()));
    }

    #[test]
    fn test_quota_failure_is_swallowed() {
        let store = PersistentStore::new(Arc::new(MemoryBackend::with_quota(16)));
        store.set("tableScale", &110);

        // Too large: logged, previous value kept
        store.set("tableScale", &"x".repeat(64));
        assert_eq!(store.get::<i64>("tableScale", 100), 110);

        let err = store.try_set("tableScale", &"x".repeat(64)).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_remove() {
        let (_, store) = memory_store();
        store.set("tableScale", &120);
        store.remove("tableScale");
        assert_eq!(store.get::<i64>("tableScale", 100), 100);
    }

    #[test]
    fn test_sqlite_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let store = PersistentStore::new(Arc::new(SqliteBackend::open(&path).unwrap()));
            store.set("tableScale", &150);
            store.set_text("stagesColumnTitle", "Фаза");
        }

        let backend = SqliteBackend::open(&path).unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["stagesColumnTitle", "tableScale"]);

        let store = PersistentStore::new(Arc::new(backend));
        assert_eq!(store.get::<i64>("tableScale", 100), 150);
        assert_eq!(store.get_text("stagesColumnTitle"), Some("Фаза".to_string()));

        store.remove("tableScale");
        assert_eq!(store.lookup::<i64>("tableScale"), Lookup::Missing);
    }
}
