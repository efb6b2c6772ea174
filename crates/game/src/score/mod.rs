use glam::Vec3;

use crate::net::ScoreEntryState;
use crate::world::PlayerId;

const PALETTE: [Vec3; 4] = [
    Vec3::new(1.0, 1.0, 0.88),
    Vec3::new(0.68, 0.85, 0.9),
    Vec3::new(1.0, 0.71, 0.76),
    Vec3::new(0.56, 0.93, 0.56),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub color: Vec3,
    pub score: i32,
}

#[derive(Debug, Default)]
pub struct ScoreBoard {
    entries: Vec<ScoreEntry>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, player_id: PlayerId, name: &str) -> &ScoreEntry {
        self.remove_entry(player_id);

        let color = PALETTE[player_id as usize % PALETTE.len()];
        self.entries.push(ScoreEntry {
            player_id,
            name: name.to_owned(),
            color,
            score: 0,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn remove_entry(&mut self, player_id: PlayerId) -> Option<ScoreEntry> {
        let position = self.entries.iter().position(|e| e.player_id == player_id)?;
        Some(self.entries.remove(position))
    }

    pub fn inc_score(&mut self, player_id: PlayerId, amount: i32) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.player_id == player_id) {
            entry.score += amount;
        }
    }

    pub fn entry(&self, player_id: PlayerId) -> Option<&ScoreEntry> {
        self.entries.iter().find(|e| e.player_id == player_id)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn to_network_state(&self) -> Vec<ScoreEntryState> {
        self.entries
            .iter()
            .map(|e| ScoreEntryState {
                player_id: e.player_id,
                name: e.name.clone(),
                color: e.color.into(),
                score: e.score,
            })
            .collect()
    }
}
