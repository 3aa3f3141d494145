//! Remote List State
//!
//! Local copy of a remote table plus load bookkeeping. Every load is tagged
//! with a generation; a result arriving after a newer load started, or after
//! the screen was left, is dropped.

use crate::domain::{Entity, GatewayResult};
use super::notice::Notices;

/// Generation a load was started under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
pub struct RemoteList<T> {
    items: Vec<T>,
    loading: bool,
    generation: u64,
}

impl<T> Default for RemoteList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            generation: 0,
        }
    }
}

impl<T: Entity<Id = String>> RemoteList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Start a load, superseding any load in flight
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply a load result; false (and no change) when the ticket is stale
    pub fn finish_load(&mut self, ticket: LoadTicket, items: Vec<T>) -> bool {
        if !self.is_current(ticket) {
            log::warn!("Dropping stale load result (generation {})", ticket.0);
            return false;
        }
        self.items = items;
        self.loading = false;
        true
    }

    /// Record a failed load; false when the ticket is stale
    pub fn fail_load(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        true
    }

    /// Apply a load outcome, queueing `failure_message` on a current failure
    ///
    /// Returns true only when fresh items were applied.
    pub fn settle(
        &mut self,
        ticket: LoadTicket,
        result: GatewayResult<Vec<T>>,
        notices: &mut Notices,
        failure_message: &str,
    ) -> bool {
        match result {
            Ok(items) => self.finish_load(ticket, items),
            Err(e) => {
                if self.fail_load(ticket) {
                    log::error!("{}: {}", failure_message, e);
                    notices.error(failure_message);
                }
                false
            }
        }
    }

    /// Forget loads in flight, e.g. when navigating away
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// Replace the item with the same id
    pub fn replace(&mut self, item: T) -> bool {
        let id = item.id();
        match self.items.iter_mut().find(|existing| existing.id() == id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GatewayError, Unit};

    fn item(id: u32) -> Unit {
        Unit {
            id: id.to_string(),
            name: format!("unit {}", id),
            short_name: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_superseded_load_is_dropped() {
        let mut list = RemoteList::new();
        let first = list.begin_load();
        let second = list.begin_load();

        assert!(list.finish_load(second, vec![item(2)]));
        assert!(!list.finish_load(first, vec![item(1)]));
        assert_eq!(list.items(), &[item(2)]);
        assert!(!list.is_loading());
    }

    #[test]
    fn test_invalidate_drops_in_flight_load() {
        let mut list: RemoteList<Unit> = RemoteList::new();
        let ticket = list.begin_load();
        list.invalidate();

        assert!(!list.finish_load(ticket, vec![item(1)]));
        assert!(!list.fail_load(ticket));
        assert!(list.items().is_empty());
    }

    #[test]
    fn test_settle_reports_current_failures_only() {
        let mut list: RemoteList<Unit> = RemoteList::new();
        let mut notices = Notices::default();

        let stale = list.begin_load();
        let current = list.begin_load();
        assert!(!list.settle(stale, Err(GatewayError::Network("down".into())), &mut notices, "failed"));
        assert!(notices.is_empty());

        assert!(!list.settle(current, Err(GatewayError::Network("down".into())), &mut notices, "failed"));
        assert_eq!(notices.len(), 1);
        assert!(!list.is_loading());
    }

    #[test]
    fn test_local_mutations() {
        let mut list = RemoteList::new();
        list.append(item(1));
        list.prepend(item(2));
        assert_eq!(list.items()[0].id, "2");

        let mut renamed = item(1);
        renamed.name = "renamed".to_string();
        assert!(list.replace(renamed));
        assert_eq!(list.get("1").unwrap().name, "renamed");
        assert!(!list.replace(item(9)));

        assert!(list.remove("2"));
        assert!(!list.remove("2"));
        assert_eq!(list.items().len(), 1);
    }
}
