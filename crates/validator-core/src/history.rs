//! In-memory judgement history for one session, newest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::idea::ToneLevel;

/// A judged idea. Created once a reply arrives and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgementEntry {
    /// Creation time in unix milliseconds; unique within a session.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tone_level: ToneLevel,
    pub reply_text: String,
}

impl JudgementEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.id)
    }
}

/// Hands out millisecond timestamps that never repeat.
#[derive(Debug, Default)]
pub struct EntryClock {
    last: i64,
}

impl EntryClock {
    pub fn next_id(&mut self) -> i64 {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    fn next_id_at(&mut self, now_millis: i64) -> i64 {
        let id = now_millis.max(self.last + 1);
        self.last = id;
        id
    }
}

#[derive(Debug, Default, Clone)]
pub struct History {
    entries: VecDeque<JudgementEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: JudgementEntry) {
        self.entries.push_front(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &JudgementEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&JudgementEntry> {
        self.entries.front()
    }

    pub fn nth(&self, index: usize) -> Option<&JudgementEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, title: &str) -> JudgementEntry {
        JudgementEntry {
            id,
            title: title.to_string(),
            description: String::new(),
            tone_level: ToneLevel::default(),
            reply_text: format!("reply to {title}"),
        }
    }

    #[test]
    fn test_push_prepends() {
        let mut history = History::new();
        history.push(entry(1, "first"));
        history.push(entry(2, "second"));
        history.push(entry(3, "third"));

        let titles: Vec<&str> = history.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
        assert_eq!(history.latest().map(|e| e.id), Some(3));
        assert_eq!(history.nth(1).map(|e| e.id), Some(2));
    }

    #[test]
    fn test_clock_never_repeats() {
        let mut clock = EntryClock::default();
        assert_eq!(clock.next_id_at(1_000), 1_000);
        assert_eq!(clock.next_id_at(1_000), 1_001);
        assert_eq!(clock.next_id_at(999), 1_002);
        assert_eq!(clock.next_id_at(5_000), 5_000);
    }

    #[test]
    fn test_created_at_from_id() {
        let e = entry(1_700_000_000_000, "x");
        assert_eq!(e.created_at().map(|t| t.timestamp()), Some(1_700_000_000));
    }
}
