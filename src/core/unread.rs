use std::collections::HashMap;

/// Unread message counts per room id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnreadCounts {
    counts: HashMap<String, u32>,
}

impl UnreadCounts {
    pub fn increment(&mut self, room_id: &str) {
        *self.counts.entry(room_id.to_string()).or_insert(0) += 1;
    }

    pub fn clear(&mut self, room_id: &str) {
        self.counts.remove(room_id);
    }

    pub fn get(&self, room_id: &str) -> u32 {
        self.counts.get(room_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}
