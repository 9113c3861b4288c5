//! Snapshot timeline backing undo, redo and jump-to-state.
//!
//! Entries live in an arena keyed by [`EntryId`]; `prev`/`next` are id links,
//! never ownership. Ids grow monotonically along the list, so every entry
//! after the cursor has a larger id than the cursor and branch truncation is a
//! single `split_off` plus one rewired link.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a history entry. Starts at 1 and is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl EntryId {
    /// Id given to the first entry of a fresh timeline.
    pub const INITIAL: EntryId = EntryId(1);

    fn successor(self) -> EntryId {
        EntryId(self.0 + 1)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One snapshot in the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry<S> {
    id: EntryId,
    snapshot: S,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

impl<S> HistoryEntry<S> {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }

    pub fn prev(&self) -> Option<EntryId> {
        self.prev
    }

    pub fn next(&self) -> Option<EntryId> {
        self.next
    }
}

/// Presentation-facing view of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: EntryId,
    /// The cursor points at this entry.
    pub is_current: bool,
    /// This is the only entry of the timeline (the blank starting state).
    pub is_initial: bool,
}

impl EntrySummary {
    /// Label used by history lists.
    pub fn label(&self) -> String {
        if self.is_initial {
            "Initial State".to_string()
        } else {
            format!("State {}", self.id)
        }
    }
}

/// A doubly-linked, branch-truncating sequence of snapshots with a cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline<S> {
    entries: BTreeMap<EntryId, HistoryEntry<S>>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    current: Option<EntryId>,
    next_id: u64,
    /// Maximum number of entries kept; oldest are dropped first.
    limit: Option<usize>,
}

impl<S> Default for Timeline<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Timeline<S> {
    /// Create an empty, unbounded timeline.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            head: None,
            tail: None,
            current: None,
            next_id: EntryId::INITIAL.0,
            limit: None,
        }
    }

    /// Create an empty timeline that keeps at most `max_entries` snapshots.
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            limit: Some(max_entries.max(1)),
            ..Self::new()
        }
    }

    /// Append a snapshot after the cursor.
    ///
    /// Any entries after the cursor (an undone future) are discarded first.
    /// The new entry becomes both tail and current.
    pub fn append(&mut self, snapshot: S) -> &HistoryEntry<S> {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        self.truncate_after_current();

        let prev = self.tail;
        if let Some(tail) = prev.and_then(|tail| self.entries.get_mut(&tail)) {
            tail.next = Some(id);
        }
        if self.head.is_none() {
            self.head = Some(id);
        }
        self.entries.insert(
            id,
            HistoryEntry {
                id,
                snapshot,
                prev,
                next: None,
            },
        );
        self.tail = Some(id);
        self.current = Some(id);

        self.enforce_limit();
        &self.entries[&id]
    }

    /// Drop every entry after the cursor. Returns how many were removed.
    fn truncate_after_current(&mut self) -> usize {
        let Some(current) = self.current else {
            return 0;
        };
        if self.tail == Some(current) {
            return 0;
        }

        let dropped = self.entries.split_off(&current.successor());
        if let Some(entry) = self.entries.get_mut(&current) {
            entry.next = None;
        }
        self.tail = Some(current);

        log::debug!(
            "History: discarded {} undone state(s) after {}",
            dropped.len(),
            current
        );
        dropped.len()
    }

    fn enforce_limit(&mut self) {
        // A deserialized limit may be zero; the current entry always stays.
        let Some(limit) = self.limit.map(|limit| limit.max(1)) else {
            return;
        };
        while self.entries.len() > limit {
            let Some(head) = self.head else {
                break;
            };
            let Some(removed) = self.entries.remove(&head) else {
                break;
            };
            self.head = removed.next;
            if let Some(new_head) = removed.next.and_then(|id| self.entries.get_mut(&id)) {
                new_head.prev = None;
            }
            log::debug!("History: limit {} reached, dropped {}", limit, head);
        }
    }

    /// Move the cursor one step back.
    pub fn undo(&mut self) -> Option<&HistoryEntry<S>> {
        let prev = self.current().and_then(|entry| entry.prev)?;
        self.current = Some(prev);
        self.entries.get(&prev)
    }

    /// Move the cursor one step forward.
    pub fn redo(&mut self) -> Option<&HistoryEntry<S>> {
        let next = self.current().and_then(|entry| entry.next)?;
        self.current = Some(next);
        self.entries.get(&next)
    }

    /// Move the cursor to the entry with `id`, if the timeline holds it.
    pub fn jump_to(&mut self, id: EntryId) -> Option<&HistoryEntry<S>> {
        if !self.entries.contains_key(&id) {
            return None;
        }
        self.current = Some(id);
        self.entries.get(&id)
    }

    /// Remove every entry and reset the id counter. The caller re-seeds.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = None;
        self.tail = None;
        self.current = None;
        self.next_id = EntryId::INITIAL.0;
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry<S>> {
        self.current.and_then(|id| self.entries.get(&id))
    }

    pub fn current_id(&self) -> Option<EntryId> {
        self.current
    }

    pub fn head(&self) -> Option<&HistoryEntry<S>> {
        self.head.and_then(|id| self.entries.get(&id))
    }

    pub fn tail(&self) -> Option<&HistoryEntry<S>> {
        self.tail.and_then(|id| self.entries.get(&id))
    }

    pub fn get(&self, id: EntryId) -> Option<&HistoryEntry<S>> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.current().is_some_and(|entry| entry.prev.is_some())
    }

    pub fn can_redo(&self) -> bool {
        self.current().is_some_and(|entry| entry.next.is_some())
    }

    /// Entries from head to tail, following `next` links.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry<S>> + '_ {
        std::iter::successors(self.head(), move |entry| {
            entry.next.and_then(|id| self.entries.get(&id))
        })
    }

    /// Entries from head to tail, tagged with cursor and initial-state flags.
    pub fn entries(&self) -> Vec<EntrySummary> {
        let sole = self.len() == 1 && self.head == self.tail;
        self.iter()
            .map(|entry| EntrySummary {
                id: entry.id,
                is_current: Some(entry.id) == self.current,
                is_initial: sole && Some(entry.id) == self.head,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk the links and check the structural invariants.
    fn assert_well_formed<S>(timeline: &Timeline<S>) {
        assert_eq!(timeline.head.is_none(), timeline.is_empty());
        assert_eq!(timeline.current.is_none(), timeline.is_empty());

        let ids: Vec<_> = timeline.iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), timeline.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids.last().copied(), timeline.tail);
        if let Some(current) = timeline.current {
            assert!(ids.contains(&current));
        }
        for entry in timeline.iter() {
            if let Some(prev) = entry.prev() {
                assert_eq!(timeline.get(prev).and_then(|p| p.next()), Some(entry.id()));
            }
        }
    }

    fn seeded(n: u32) -> Timeline<u32> {
        let mut timeline = Timeline::new();
        for i in 0..n {
            timeline.append(i);
        }
        timeline
    }

    #[test]
    fn test_empty_timeline() {
        let mut timeline: Timeline<u32> = Timeline::new();
        assert!(timeline.is_empty());
        assert!(timeline.current().is_none());
        assert!(timeline.undo().is_none());
        assert!(timeline.redo().is_none());
        assert!(timeline.entries().is_empty());
        assert_well_formed(&timeline);
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.append("blank").id(), EntryId(1));
        assert_eq!(timeline.append("a").id(), EntryId(2));
        assert_eq!(timeline.append("b").id(), EntryId(3));
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.current_id(), Some(EntryId(3)));
        assert_eq!(timeline.head().map(|e| e.id()), Some(EntryId(1)));
        assert_well_formed(&timeline);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut timeline = seeded(4);

        assert_eq!(timeline.undo().map(|e| e.id()), Some(EntryId(3)));
        assert_eq!(timeline.undo().map(|e| *e.snapshot()), Some(1));
        assert_eq!(timeline.redo().map(|e| e.id()), Some(EntryId(3)));
        assert_eq!(timeline.redo().map(|e| e.id()), Some(EntryId(4)));
        assert!(timeline.redo().is_none());
        assert_eq!(timeline.current_id(), Some(EntryId(4)));
    }

    #[test]
    fn test_undo_at_head_is_noop() {
        let mut timeline = seeded(1);
        assert!(!timeline.can_undo());
        assert!(timeline.undo().is_none());
        assert_eq!(timeline.current_id(), Some(EntryId(1)));
    }

    #[test]
    fn test_append_after_undo_truncates_future() {
        let mut timeline = seeded(5);
        timeline.undo();
        timeline.undo();

        let id = timeline.append(99).id();
        assert_eq!(id, EntryId(6));
        assert_eq!(timeline.len(), 4);
        assert!(timeline.get(EntryId(4)).is_none());
        assert!(timeline.get(EntryId(5)).is_none());
        assert!(!timeline.can_redo());
        assert!(timeline.redo().is_none());

        let ids: Vec<_> = timeline.iter().map(|e| e.id().0).collect();
        assert_eq!(ids, vec![1, 2, 3, 6]);
        assert_well_formed(&timeline);
    }

    #[test]
    fn test_jump_to() {
        let mut timeline = seeded(4);
        assert_eq!(timeline.jump_to(EntryId(2)).map(|e| e.id()), Some(EntryId(2)));
        assert_eq!(timeline.undo().map(|e| e.id()), Some(EntryId(1)));

        timeline.jump_to(EntryId(2));
        assert_eq!(timeline.redo().map(|e| e.id()), Some(EntryId(3)));
    }

    #[test]
    fn test_jump_to_unknown_id_is_noop() {
        let mut timeline = seeded(3);
        timeline.undo();
        assert!(timeline.jump_to(EntryId(42)).is_none());
        assert_eq!(timeline.current_id(), Some(EntryId(2)));
    }

    #[test]
    fn test_jump_to_truncated_id_fails() {
        let mut timeline = seeded(3);
        timeline.undo();
        timeline.append(7);
        assert!(timeline.jump_to(EntryId(3)).is_none());
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut timeline = seeded(3);
        timeline.clear();
        assert!(timeline.is_empty());
        assert_well_formed(&timeline);
        assert_eq!(timeline.append(0).id(), EntryId::INITIAL);
        assert!(timeline.undo().is_none());
    }

    #[test]
    fn test_entry_flags() {
        let mut timeline = seeded(1);
        let entries = timeline.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_initial);
        assert!(entries[0].is_current);
        assert_eq!(entries[0].label(), "Initial State");

        timeline.append(1);
        timeline.undo();
        let entries = timeline.entries();
        assert!(entries.iter().all(|e| !e.is_initial));
        assert!(entries[0].is_current);
        assert!(!entries[1].is_current);
        assert_eq!(entries[1].label(), "State 2");
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut timeline = Timeline::with_limit(3);
        for i in 0..5 {
            timeline.append(i);
        }
        assert_eq!(timeline.len(), 3);
        let ids: Vec<_> = timeline.iter().map(|e| e.id().0).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert!(timeline.head().and_then(|e| e.prev()).is_none());
        assert_well_formed(&timeline);

        timeline.undo();
        timeline.undo();
        assert!(timeline.undo().is_none());
    }

    #[test]
    fn test_deserialized_zero_limit_keeps_current() {
        let mut value = serde_json::to_value(seeded(2)).unwrap();
        value["limit"] = serde_json::json!(0);
        let mut timeline: Timeline<u32> = serde_json::from_value(value).unwrap();

        let appended = timeline.append(7).id();
        assert_eq!(appended, EntryId(3));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.current().map(|e| e.snapshot()), Some(&7));
        assert!(!timeline.can_undo());
        assert_well_formed(&timeline);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut timeline = seeded(3);
        timeline.undo();
        let json = serde_json::to_string(&timeline).unwrap();
        let restored: Timeline<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.current_id(), Some(EntryId(2)));
        assert_eq!(restored.entries(), timeline.entries());
        assert_well_formed(&restored);
    }
}
