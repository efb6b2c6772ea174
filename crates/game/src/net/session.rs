use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::simulation::{Move, MoveList};
use crate::world::PlayerId;

use super::protocol::MoveRecord;

const DEFAULT_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("server full ({0} players)")]
    ServerFull(usize),
}

#[derive(Debug)]
pub struct ClientProxy {
    pub addr: SocketAddr,
    pub player_id: PlayerId,
    pub name: String,
    unprocessed_moves: MoveList,
    processed_moves: MoveList,
    last_processed_timestamp: f32,
    last_hyper_yarn_shot_time: Option<f32>,
    time_to_respawn: Option<f32>,
    last_packet_time: Instant,
}

impl ClientProxy {
    pub fn new(addr: SocketAddr, player_id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            addr,
            player_id,
            name: name.into(),
            unprocessed_moves: MoveList::new(),
            processed_moves: MoveList::new(),
            last_processed_timestamp: -1.0,
            last_hyper_yarn_shot_time: None,
            time_to_respawn: None,
            last_packet_time: Instant::now(),
        }
    }

    pub fn receive_moves<I>(&mut self, moves: I) -> usize
    where
        I: IntoIterator<Item = MoveRecord>,
    {
        let mut accepted = 0;
        for record in moves {
            if self.unprocessed_moves.add_move_if_new(&Move::from(record)) {
                accepted += 1;
            }
        }
        if accepted > 0 {
            log::trace!("player {} queued {} new moves", self.player_id, accepted);
        }
        accepted
    }

    pub fn unprocessed_moves(&self) -> &MoveList {
        &self.unprocessed_moves
    }

    pub fn unprocessed_moves_mut(&mut self) -> &mut MoveList {
        &mut self.unprocessed_moves
    }

    pub fn processed_moves(&self) -> &MoveList {
        &self.processed_moves
    }

    pub fn processed_moves_mut(&mut self) -> &mut MoveList {
        &mut self.processed_moves
    }

    pub fn mark_processed(&mut self, mv: &Move) {
        self.processed_moves.add_existing_move(mv);
        self.last_processed_timestamp = self.last_processed_timestamp.max(mv.timestamp());
    }

    pub fn last_processed_timestamp(&self) -> f32 {
        self.last_processed_timestamp
    }

    pub fn last_hyper_yarn_shot_time(&self) -> Option<f32> {
        self.last_hyper_yarn_shot_time
    }

    pub fn set_last_hyper_yarn_shot_time(&mut self, time: f32) {
        self.last_hyper_yarn_shot_time = Some(time);
    }

    pub fn can_hyper_shoot(&self, now: f32, cooldown: f32) -> bool {
        self.last_hyper_yarn_shot_time
            .is_none_or(|last| last + cooldown <= now)
    }

    pub fn handle_cat_died(&mut self, now: f32, respawn_delay: f32) {
        self.time_to_respawn = Some(now + respawn_delay);
    }

    pub fn is_awaiting_respawn(&self) -> bool {
        self.time_to_respawn.is_some()
    }

    pub fn take_respawn_due(&mut self, now: f32) -> bool {
        match self.time_to_respawn {
            Some(at) if now >= at => {
                self.time_to_respawn = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_packet_time.elapsed() > timeout
    }

    pub fn touch(&mut self) {
        self.last_packet_time = Instant::now();
    }
}

#[derive(Debug)]
pub struct SessionTable {
    players_by_addr: HashMap<SocketAddr, PlayerId>,
    sessions: HashMap<PlayerId, ClientProxy>,
    next_player_id: PlayerId,
    max_clients: usize,
    timeout: Duration,
}

impl SessionTable {
    pub fn new(max_clients: usize) -> Self {
        Self::with_timeout(max_clients, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(max_clients: usize, timeout_secs: u64) -> Self {
        Self {
            players_by_addr: HashMap::new(),
            sessions: HashMap::new(),
            next_player_id: 1,
            max_clients,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn get_or_create(
        &mut self,
        addr: SocketAddr,
        name: &str,
    ) -> Result<(&mut ClientProxy, bool), SessionError> {
        let (player_id, created) = match self.players_by_addr.get(&addr) {
            Some(&id) if self.sessions.contains_key(&id) => (id, false),
            _ => {
                if self.sessions.len() >= self.max_clients {
                    return Err(SessionError::ServerFull(self.max_clients));
                }
                let id = self.next_player_id;
                self.next_player_id += 1;
                self.players_by_addr.insert(addr, id);
                (id, true)
            }
        };

        let session = self
            .sessions
            .entry(player_id)
            .or_insert_with(|| ClientProxy::new(addr, player_id, name));
        Ok((session, created))
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&ClientProxy> {
        self.sessions.get(&player_id)
    }

    pub fn get_mut(&mut self, player_id: PlayerId) -> Option<&mut ClientProxy> {
        self.sessions.get_mut(&player_id)
    }

    pub fn get_by_addr(&self, addr: &SocketAddr) -> Option<&ClientProxy> {
        self.players_by_addr
            .get(addr)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn get_by_addr_mut(&mut self, addr: &SocketAddr) -> Option<&mut ClientProxy> {
        if let Some(&id) = self.players_by_addr.get(addr) {
            self.sessions.get_mut(&id)
        } else {
            None
        }
    }

    pub fn remove(&mut self, player_id: PlayerId) -> Option<ClientProxy> {
        let session = self.sessions.remove(&player_id)?;
        self.players_by_addr.remove(&session.addr);
        Some(session)
    }

    pub fn remove_by_addr(&mut self, addr: &SocketAddr) -> Option<ClientProxy> {
        let player_id = self.players_by_addr.remove(addr)?;
        self.sessions.remove(&player_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientProxy> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClientProxy> {
        self.sessions.values_mut()
    }

    pub fn cleanup_timed_out(&mut self) -> Vec<ClientProxy> {
        let timed_out: Vec<PlayerId> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.is_timed_out(self.timeout))
            .map(|(&id, _)| id)
            .collect();

        timed_out
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::InputState;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn record(timestamp: f32) -> MoveRecord {
        MoveRecord {
            input: InputState::new(),
            timestamp,
        }
    }

    #[test]
    fn same_address_reuses_session() {
        let mut table = SessionTable::new(4);
        let (first, created) = table.get_or_create(addr(1000), "tom").unwrap();
        let id = first.player_id;
        assert!(created);

        let (again, created) = table.get_or_create(addr(1000), "tom").unwrap();
        assert_eq!(again.player_id, id);
        assert!(!created);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn full_table_rejects_without_allocating() {
        let mut table = SessionTable::new(1);
        let (first, _) = table.get_or_create(addr(1000), "a").unwrap();
        let first_id = first.player_id;

        let err = table.get_or_create(addr(1001), "b").unwrap_err();
        assert_eq!(err, SessionError::ServerFull(1));

        table.remove(first_id);
        let (next, _) = table.get_or_create(addr(1001), "b").unwrap();
        assert_eq!(next.player_id, first_id + 1);
    }

    #[test]
    fn remove_by_addr_drops_both_indices() {
        let mut table = SessionTable::new(4);
        let (session, _) = table.get_or_create(addr(1000), "a").unwrap();
        let id = session.player_id;

        assert!(table.remove_by_addr(&addr(1000)).is_some());
        assert!(table.get(id).is_none());
        assert!(table.get_by_addr(&addr(1000)).is_none());
    }

    #[test]
    fn receive_moves_filters_duplicates_and_stale() {
        let mut proxy = ClientProxy::new(addr(1000), 1, "a");

        assert_eq!(proxy.receive_moves([record(1.0), record(1.5)]), 2);
        // Redundant resend plus one new move.
        assert_eq!(proxy.receive_moves([record(1.0), record(1.5), record(2.0)]), 1);
        // Out of order arrival of an old move.
        assert_eq!(proxy.receive_moves([record(1.2)]), 0);

        let timestamps: Vec<f32> = proxy.unprocessed_moves().iter().map(Move::timestamp).collect();
        assert_eq!(timestamps, vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn ack_follows_processed_moves_only() {
        let mut proxy = ClientProxy::new(addr(1000), 1, "a");
        proxy.receive_moves([record(1.0), record(1.5)]);
        assert_eq!(proxy.last_processed_timestamp(), -1.0);

        let first = proxy.unprocessed_moves().iter().copied().next().unwrap();
        proxy.mark_processed(&first);

        assert_eq!(proxy.last_processed_timestamp(), 1.0);
        assert_eq!(proxy.unprocessed_moves().last_timestamp(), 1.5);
    }

    #[test]
    fn hyper_cooldown_gate() {
        let mut proxy = ClientProxy::new(addr(1000), 1, "a");
        assert!(proxy.can_hyper_shoot(0.0, 2.0));

        proxy.set_last_hyper_yarn_shot_time(1.0);
        assert!(!proxy.can_hyper_shoot(2.9, 2.0));
        assert!(proxy.can_hyper_shoot(3.0, 2.0));
    }

    #[test]
    fn respawn_fires_once_after_delay() {
        let mut proxy = ClientProxy::new(addr(1000), 1, "a");
        proxy.handle_cat_died(10.0, 3.0);

        assert!(proxy.is_awaiting_respawn());
        assert!(!proxy.take_respawn_due(12.0));
        assert!(proxy.take_respawn_due(13.0));
        assert!(!proxy.take_respawn_due(14.0));
        assert!(!proxy.is_awaiting_respawn());
    }
}
