//! Typing presence: who else is typing in the current room, and whether we are.

use std::time::{Duration, Instant};

/// Usernames typing in the current room, in the order they started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypingSet {
    users: Vec<String>,
}

impl TypingSet {
    pub fn insert(&mut self, username: &str) {
        if !self.users.iter().any(|u| u == username) {
            self.users.push(username.to_string());
        }
    }

    pub fn remove(&mut self, username: &str) {
        self.users.retain(|u| u != username);
    }

    pub fn clear(&mut self) {
        self.users.clear();
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Indicator line, or `None` when nobody is typing.
    pub fn indicator_text(&self) -> Option<String> {
        match self.users.as_slice() {
            [] => None,
            [one] => Some(format!("{one} is typing...")),
            [a, b] => Some(format!("{a} and {b} are typing...")),
            many => Some(format!("{} people are typing...", many.len())),
        }
    }
}

/// Local typing flag with its idle deadline.
///
/// `keystroke` re-arms the deadline and reports whether `typing_start`
/// must be emitted; `stop` reports whether `typing_stop` must be emitted.
#[derive(Debug, Clone)]
pub struct LocalTyping {
    idle: Duration,
    deadline: Option<Instant>,
}

impl LocalTyping {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            deadline: None,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn keystroke(&mut self, now: Instant) -> bool {
        let started = self.deadline.is_none();
        self.deadline = Some(now + self.idle);
        started
    }

    pub fn stop(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> TypingSet {
        let mut set = TypingSet::default();
        for name in names {
            set.insert(name);
        }
        set
    }

    #[test]
    fn indicator_text_by_count() {
        assert_eq!(set(&[]).indicator_text(), None);
        assert_eq!(set(&["bob"]).indicator_text().unwrap(), "bob is typing...");
        assert_eq!(
            set(&["bob", "carol"]).indicator_text().unwrap(),
            "bob and carol are typing..."
        );
        assert_eq!(
            set(&["bob", "carol", "dave"]).indicator_text().unwrap(),
            "3 people are typing..."
        );
    }

    #[test]
    fn insert_is_idempotent_and_remove_keeps_order() {
        let mut typing = set(&["a", "b", "a", "c"]);
        assert_eq!(typing.len(), 3);
        typing.remove("b");
        assert_eq!(typing.indicator_text().unwrap(), "a and c are typing...");
    }

    #[test]
    fn keystrokes_start_once_and_rearm() {
        let t0 = Instant::now();
        let mut local = LocalTyping::new(Duration::from_secs(2));
        assert!(local.keystroke(t0));
        assert!(!local.keystroke(t0 + Duration::from_millis(500)));
        assert!(!local.keystroke(t0 + Duration::from_millis(1000)));
        assert!(!local.expired(t0 + Duration::from_millis(2500)));
        assert!(local.expired(t0 + Duration::from_millis(3000)));
        assert!(local.stop());
        assert!(!local.stop());
        assert!(!local.is_typing());
    }
}
