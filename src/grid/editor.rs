//! Edit Session
//!
//! One-target edit buffer shared by grid cells, grid headers and reference lists:
//! `idle -> editing` on begin, back to `idle` on commit or cancel.
//! Beginning a new edit while one is open drops the old buffer without saving.

/// Edit state for targets of type `T`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession<T> {
    target: Option<T>,
    buffer: String,
}

impl<T> Default for EditSession<T> {
    fn default() -> Self {
        Self {
            target: None,
            buffer: String::new(),
        }
    }
}

impl<T: PartialEq> EditSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `target`, seeding the buffer with its current value
    pub fn begin(&mut self, target: T, current: &str) {
        self.target = Some(target);
        self.buffer = current.to_string();
    }

    pub fn is_editing(&self, target: &T) -> bool {
        self.target.as_ref() == Some(target)
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer; ignored while idle
    pub fn set_buffer(&mut self, value: impl Into<String>) {
        if self.target.is_some() {
            self.buffer = value.into();
        }
    }

    /// Close the session, handing back target and buffer
    pub fn commit(&mut self) -> Option<(T, String)> {
        let target = self.target.take()?;
        Some((target, std::mem::take(&mut self.buffer)))
    }

    /// Close the session discarding the buffer
    pub fn cancel(&mut self) {
        self.target = None;
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_commit() {
        let mut session = EditSession::new();
        session.begin("a", "old");
        assert!(session.is_editing(&"a"));
        session.set_buffer("new");

        assert_eq!(session.commit(), Some(("a", "new".to_string())));
        assert!(!session.is_active());
        assert_eq!(session.buffer(), "");
    }

    #[test]
    fn test_cancel_discards_buffer() {
        let mut session = EditSession::new();
        session.begin(1, "value");
        session.set_buffer("changed");
        session.cancel();

        assert_eq!(session.commit(), None);
    }

    #[test]
    fn test_switch_target_drops_uncommitted_buffer() {
        let mut session = EditSession::new();
        session.begin("a", "");
        session.set_buffer("typed but not saved");
        session.begin("b", "b value");

        assert!(!session.is_editing(&"a"));
        assert_eq!(session.buffer(), "b value");
    }

    #[test]
    fn test_buffer_ignored_while_idle() {
        let mut session: EditSession<u8> = EditSession::new();
        session.set_buffer("x");
        assert_eq!(session.buffer(), "");
    }
}
