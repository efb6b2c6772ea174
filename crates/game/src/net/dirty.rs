use std::collections::HashMap;

use bitflags::bitflags;

use crate::world::NetworkId;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyState: u32 {
        const POSE = 1 << 0;
        const COLOR = 1 << 1;
        const PLAYER_ID = 1 << 2;
        const HEALTH = 1 << 3;
    }
}

#[derive(Debug, Default)]
pub struct DirtyBatch {
    pub changed: Vec<(NetworkId, DirtyState)>,
    pub destroyed: Vec<NetworkId>,
}

impl DirtyBatch {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.destroyed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DirtyTracker {
    flags: HashMap<NetworkId, DirtyState>,
    destroyed: Vec<NetworkId>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dirty(&mut self, network_id: NetworkId, state: DirtyState) {
        *self.flags.entry(network_id).or_default() |= state;
    }

    pub fn get(&self, network_id: NetworkId) -> DirtyState {
        self.flags.get(&network_id).copied().unwrap_or_default()
    }

    pub fn is_dirty(&self, network_id: NetworkId, state: DirtyState) -> bool {
        self.get(network_id).contains(state)
    }

    pub fn unregister(&mut self, network_id: NetworkId) {
        self.flags.remove(&network_id);
        self.destroyed.push(network_id);
    }

    pub fn take(&mut self) -> DirtyBatch {
        let mut changed: Vec<(NetworkId, DirtyState)> = self.flags.drain().collect();
        changed.sort_by_key(|(id, _)| *id);
        DirtyBatch {
            changed,
            destroyed: std::mem::take(&mut self.destroyed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.destroyed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accumulate() {
        let mut tracker = DirtyTracker::new();
        tracker.set_dirty(3, DirtyState::POSE);
        tracker.set_dirty(3, DirtyState::HEALTH);

        assert!(tracker.is_dirty(3, DirtyState::POSE | DirtyState::HEALTH));
        assert!(!tracker.is_dirty(3, DirtyState::COLOR));
        assert!(tracker.get(4).is_empty());
    }

    #[test]
    fn take_hands_over_and_clears() {
        let mut tracker = DirtyTracker::new();
        tracker.set_dirty(2, DirtyState::POSE);
        tracker.set_dirty(1, DirtyState::HEALTH);
        tracker.set_dirty(5, DirtyState::POSE);
        tracker.unregister(5);

        let batch = tracker.take();

        assert_eq!(
            batch.changed,
            vec![(1, DirtyState::HEALTH), (2, DirtyState::POSE)]
        );
        assert_eq!(batch.destroyed, vec![5]);
        assert!(tracker.is_empty());
        assert!(tracker.take().is_empty());
    }
}
