//! Rolling message log shown to the player.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::state::PersistentState;

/// Bounded log of player-facing messages, oldest first.
///
/// A message identical to the newest entry is dropped so repeated
/// refusals don't flood the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Messenger {
    capacity: usize,
    messages: VecDeque<String>,
}

impl Messenger {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            messages: VecDeque::new(),
        }
    }

    pub fn write(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.messages.back() == Some(&text) {
            return;
        }
        log::info!(target: "overseer::messages", "{text}");
        self.messages.push_back(text);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Rebuilds a log from saved messages, keeping the newest that fit.
    pub fn from_messages(capacity: usize, saved: Vec<String>) -> Self {
        let mut messenger = Self::new(capacity);
        let skip = saved.len().saturating_sub(messenger.capacity);
        messenger.messages.extend(saved.into_iter().skip(skip));
        messenger
    }

    pub fn load(state: &PersistentState, capacity: usize) -> Self {
        Self::from_messages(capacity, state.get("messages").unwrap_or_default())
    }

    pub fn store(&self, state: &mut PersistentState) {
        let messages: Vec<serde_json::Value> =
            self.messages.iter().map(|m| m.as_str().into()).collect();
        state.set_value("messages", messages.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_drops_oldest() {
        let mut messenger = Messenger::new(3);
        for i in 0..5 {
            messenger.write(format!("message {i}"));
        }
        let messages: Vec<&str> = messenger.messages().collect();
        assert_eq!(messages, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn test_adjacent_duplicates_skipped() {
        let mut messenger = Messenger::new(15);
        messenger.write("No free cores available");
        messenger.write("No free cores available");
        messenger.write("Search complete");
        messenger.write("No free cores available");
        assert_eq!(messenger.len(), 3);
        assert_eq!(messenger.latest(), Some("No free cores available"));
    }

    #[test]
    fn test_store_and_load_trims_to_capacity() {
        let mut messenger = Messenger::new(15);
        for i in 0..10 {
            messenger.write(format!("m{i}"));
        }
        let mut state = PersistentState::in_memory();
        messenger.store(&mut state);

        let reloaded = Messenger::load(&state, 4);
        let messages: Vec<&str> = reloaded.messages().collect();
        assert_eq!(messages, vec!["m6", "m7", "m8", "m9"]);
    }
}
