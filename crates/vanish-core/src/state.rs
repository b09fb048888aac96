//! In-memory vanish bookkeeping.

use std::collections::{BTreeSet, HashMap, HashSet};

/// Who is vanished, who is publicly online, and which (viewer, target)
/// pairs the host currently has hidden.
///
/// A name is in at most one of the vanished and online-visible sets.
#[derive(Debug, Default)]
pub struct VisibilityState {
    vanished: BTreeSet<String>,
    online_visible: BTreeSet<String>,
    /// viewer → targets currently hidden from that viewer.
    hidden: HashMap<String, BTreeSet<String>>,
    flight_granted: HashSet<String>,
    night_vision: HashSet<String>,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_vanished(&self, name: &str) -> bool {
        self.vanished.contains(name)
    }

    pub fn is_online_visible(&self, name: &str) -> bool {
        self.online_visible.contains(name)
    }

    pub fn vanished(&self) -> impl Iterator<Item = &str> {
        self.vanished.iter().map(String::as_str)
    }

    pub fn online_visible(&self) -> impl Iterator<Item = &str> {
        self.online_visible.iter().map(String::as_str)
    }

    pub fn vanished_count(&self) -> usize {
        self.vanished.len()
    }

    pub fn online_visible_count(&self) -> usize {
        self.online_visible.len()
    }

    /// Mark `name` vanished. Returns `false` if it already was.
    pub fn add_vanished(&mut self, name: &str) -> bool {
        if !self.vanished.insert(name.to_string()) {
            return false;
        }
        self.online_visible.remove(name);
        true
    }

    /// Clear the vanished mark and move `name` to the online-visible set.
    /// Returns `false` if it was not vanished.
    pub fn remove_vanished(&mut self, name: &str) -> bool {
        if !self.vanished.remove(name) {
            return false;
        }
        self.online_visible.insert(name.to_string());
        true
    }

    /// Drop the vanished mark without marking the player online.
    pub fn forget_vanished(&mut self, name: &str) -> bool {
        self.vanished.remove(name)
    }

    /// Add a non-vanished player to the online-visible set.
    pub fn add_online(&mut self, name: &str) -> bool {
        if self.vanished.contains(name) {
            return false;
        }
        self.online_visible.insert(name.to_string())
    }

    pub fn remove_online(&mut self, name: &str) -> bool {
        self.online_visible.remove(name)
    }

    pub fn is_hidden(&self, viewer: &str, target: &str) -> bool {
        self.hidden
            .get(viewer)
            .is_some_and(|targets| targets.contains(target))
    }

    /// Record that `target` is hidden from `viewer`. Returns `true` if this
    /// changes what the host should be showing.
    pub fn mark_hidden(&mut self, viewer: &str, target: &str) -> bool {
        self.hidden
            .entry(viewer.to_string())
            .or_default()
            .insert(target.to_string())
    }

    /// Record that `target` is shown to `viewer`. Returns `true` if the pair
    /// was previously hidden.
    pub fn mark_shown(&mut self, viewer: &str, target: &str) -> bool {
        let Some(targets) = self.hidden.get_mut(viewer) else {
            return false;
        };
        let removed = targets.remove(target);
        if targets.is_empty() {
            self.hidden.remove(viewer);
        }
        removed
    }

    /// Forget every hidden pair with `target` on the target side.
    pub fn forget_target(&mut self, target: &str) {
        self.hidden.retain(|_, targets| {
            targets.remove(target);
            !targets.is_empty()
        });
    }

    /// Forget every hidden pair involving `name` on either side.
    pub fn forget_player(&mut self, name: &str) {
        self.hidden.remove(name);
        self.forget_target(name);
        self.flight_granted.remove(name);
        self.night_vision.remove(name);
    }

    pub fn hidden_pair_count(&self) -> usize {
        self.hidden.values().map(BTreeSet::len).sum()
    }

    pub fn grant_flight(&mut self, name: &str) {
        self.flight_granted.insert(name.to_string());
    }

    /// Returns `true` if a vanish transition granted `name` flight.
    pub fn take_flight_grant(&mut self, name: &str) -> bool {
        self.flight_granted.remove(name)
    }

    pub fn grant_night_vision(&mut self, name: &str) {
        self.night_vision.insert(name.to_string());
    }

    /// Returns `true` if vanish presentation applied night vision to `name`.
    pub fn take_night_vision(&mut self, name: &str) -> bool {
        self.night_vision.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disjoint(state: &VisibilityState) -> bool {
        state.vanished().all(|n| !state.is_online_visible(n))
    }

    #[test]
    fn vanished_and_online_stay_disjoint() {
        let mut state = VisibilityState::new();
        assert!(state.add_online("Steve"));
        assert!(state.add_online("Bob"));
        assert!(state.add_vanished("Steve"));
        assert!(disjoint(&state));
        assert!(!state.add_online("Steve"));
        assert!(disjoint(&state));
        assert!(state.remove_vanished("Steve"));
        assert!(state.is_online_visible("Steve"));
        assert!(disjoint(&state));
    }

    #[test]
    fn repeated_transitions_are_noops() {
        let mut state = VisibilityState::new();
        assert!(state.add_vanished("Steve"));
        assert!(!state.add_vanished("Steve"));
        assert_eq!(state.vanished_count(), 1);
        assert!(state.remove_vanished("Steve"));
        assert!(!state.remove_vanished("Steve"));
        assert_eq!(state.online_visible_count(), 1);
    }

    #[test]
    fn hidden_pairs_report_deltas() {
        let mut state = VisibilityState::new();
        assert!(state.mark_hidden("Bob", "Steve"));
        assert!(!state.mark_hidden("Bob", "Steve"));
        assert!(state.is_hidden("Bob", "Steve"));
        assert!(state.mark_shown("Bob", "Steve"));
        assert!(!state.mark_shown("Bob", "Steve"));
        assert_eq!(state.hidden_pair_count(), 0);
    }

    #[test]
    fn forget_player_clears_both_sides() {
        let mut state = VisibilityState::new();
        state.mark_hidden("Bob", "Steve");
        state.mark_hidden("Alex", "Steve");
        state.mark_hidden("Steve", "Root");
        state.grant_flight("Steve");
        state.grant_night_vision("Steve");
        state.forget_player("Steve");
        assert_eq!(state.hidden_pair_count(), 0);
        assert!(!state.take_flight_grant("Steve"));
        assert!(!state.take_night_vision("Steve"));
    }
}
