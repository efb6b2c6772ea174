use std::collections::VecDeque;

use super::input::InputState;

/// One sampled input and the game time it was sampled at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    input_state: InputState,
    timestamp: f32,
    delta_time: f32,
}

impl Move {
    pub(crate) fn new(input_state: InputState, timestamp: f32, delta_time: f32) -> Self {
        Self {
            input_state,
            timestamp,
            delta_time,
        }
    }

    pub fn input_state(&self) -> &InputState {
        &self.input_state
    }

    pub fn timestamp(&self) -> f32 {
        self.timestamp
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }
}

/// Timestamp-ordered move buffer owned by a single client session.
///
/// `last_timestamp` is the acceptance watermark: it only ever grows, and
/// survives [`MoveList::clear`], so a move that was already consumed is still
/// recognised as stale when it arrives again in a later packet.
#[derive(Debug, Clone)]
pub struct MoveList {
    moves: VecDeque<Move>,
    last_timestamp: f32,
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            moves: VecDeque::new(),
            last_timestamp: -1.0,
        }
    }

    pub fn add_move(&mut self, input_state: InputState, timestamp: f32) -> &Move {
        // First move ever gets zero delta.
        let delta_time = if self.last_timestamp >= 0.0 {
            timestamp - self.last_timestamp
        } else {
            0.0
        };

        self.moves
            .push_back(Move::new(input_state, timestamp, delta_time));
        self.last_timestamp = timestamp;

        &self.moves[self.moves.len() - 1]
    }

    /// Appends an already validated move as-is.
    pub fn add_existing_move(&mut self, mv: &Move) -> &Move {
        self.moves.push_back(*mv);
        &self.moves[self.moves.len() - 1]
    }

    /// Accepts `mv` only if it is newer than anything seen so far. The delta is
    /// recomputed against this list since the move may come from another one.
    pub fn add_move_if_new(&mut self, mv: &Move) -> bool {
        let timestamp = mv.timestamp();
        if timestamp <= self.last_timestamp {
            return false;
        }

        let delta_time = if self.last_timestamp >= 0.0 {
            timestamp - self.last_timestamp
        } else {
            0.0
        };

        self.last_timestamp = timestamp;
        self.moves
            .push_back(Move::new(mv.input_state, timestamp, delta_time));
        true
    }

    /// Drains the leading moves with `timestamp <= ack_timestamp`.
    pub fn remove_processed_moves(&mut self, ack_timestamp: f32) -> Vec<Move> {
        let mut removed = Vec::new();
        while let Some(front) = self.moves.front() {
            if front.timestamp > ack_timestamp {
                break;
            }
            if let Some(mv) = self.moves.pop_front() {
                removed.push(mv);
            }
        }
        removed
    }

    /// Moves newer than `timestamp`, oldest first. The scan starts at the
    /// newest move and stops at the first one that is not newer, which relies
    /// on the list being sorted.
    pub fn moves_since(
        &self,
        timestamp: f32,
    ) -> impl DoubleEndedIterator<Item = &Move> + ExactSizeIterator + '_ {
        let newer = self
            .moves
            .iter()
            .rev()
            .take_while(|mv| mv.timestamp > timestamp)
            .count();
        self.moves.range(self.moves.len() - newer..)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Move> + ExactSizeIterator + '_ {
        self.moves.iter()
    }

    pub fn front(&self) -> Option<&Move> {
        self.moves.front()
    }

    pub fn back(&self) -> Option<&Move> {
        self.moves.back()
    }

    pub fn last_timestamp(&self) -> f32 {
        self.last_timestamp
    }

    pub fn has_moves(&self) -> bool {
        !self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
