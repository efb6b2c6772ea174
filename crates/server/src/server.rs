use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use glam::Vec3;

use robocat::{
    CatController, ControlType, DirtyState, DirtyTracker, FixedTimestep, MoveRecord, NetworkId,
    Packet, PacketSink, PacketType, PlayerId, ScoreBoard, ServerSimulation, SessionTable, Timing,
    World, spawn_cat,
};

use crate::config::ServerConfig;
use crate::endpoint::NetworkEndpoint;
use crate::events::{DisconnectReason, ServerEvent};
use crate::replication::collect_state;

const AI_COLOR: Vec3 = Vec3::new(0.5, 0.5, 0.5);
const MAX_NAME_LEN: usize = 16;
const STATS_INTERVAL: Duration = Duration::from_secs(10);

pub struct GameServer {
    endpoint: NetworkEndpoint,
    config: ServerConfig,
    controller: CatController,
    world: World,
    sessions: SessionTable,
    scores: ScoreBoard,
    dirty: DirtyTracker,
    timing: Timing,
    timestep: FixedTimestep,
    last_frame: Instant,
    last_stats: Instant,
    pending_events: VecDeque<ServerEvent>,
}

impl GameServer {
    pub fn new(bind_addr: &str, config: ServerConfig) -> io::Result<Self> {
        let endpoint = NetworkEndpoint::bind(bind_addr)?;

        let mut server = Self {
            endpoint,
            controller: CatController::new(config.cat.clone()),
            world: World::new(),
            sessions: SessionTable::with_timeout(config.max_clients, config.client_timeout_secs),
            scores: ScoreBoard::new(),
            dirty: DirtyTracker::new(),
            timing: Timing::new(),
            timestep: FixedTimestep::new(config.tick_rate),
            last_frame: Instant::now(),
            last_stats: Instant::now(),
            pending_events: VecDeque::new(),
            config,
        };
        server.spawn_ai_cats();

        Ok(server)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    pub fn run(&mut self) {
        loop {
            self.tick_once();

            for event in self.pending_events.drain(..) {
                event.log();
            }

            if self.last_stats.elapsed() >= STATS_INTERVAL {
                self.last_stats = Instant::now();
                let stats = self.endpoint.stats();
                log::debug!(
                    "tick {} | {} players | {} entities | sent {} ({} B) recv {} ({} B) dropped {}",
                    self.timing.tick(),
                    self.sessions.len(),
                    self.world.entity_count(),
                    stats.packets_sent,
                    stats.bytes_sent,
                    stats.packets_received,
                    stats.bytes_received,
                    stats.packets_dropped
                );
            }

            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn tick_once(&mut self) {
        let now = Instant::now();
        self.timestep.accumulate((now - self.last_frame).as_secs_f32());
        self.last_frame = now;

        if let Err(e) = self.process_network() {
            self.pending_events.push_back(ServerEvent::Error {
                message: format!("network error: {}", e),
            });
        }

        while self.timestep.consume_tick() {
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.timing.advance(self.timestep.dt());

        self.respawn_cats();

        let mut sim = ServerSimulation {
            timing: &self.timing,
            controller: &self.controller,
            sessions: &mut self.sessions,
            scores: &mut self.scores,
            dirty: &mut self.dirty,
            sink: &mut self.endpoint,
        };
        self.world.update(&mut sim);

        self.send_state();
        self.drop_timed_out();
    }

    fn send_state(&mut self) {
        let batch = self.dirty.take();
        let packets = collect_state(&batch, &self.world, &self.scores);
        let history = self.config.cat.processed_move_history;

        for session in self.sessions.iter_mut() {
            let ack = session.last_processed_timestamp();
            for packet in &packets {
                let mut state = packet.clone();
                state.last_move_timestamp = ack;
                self.endpoint.send_packet(PacketType::State(state), session.addr);
            }

            session
                .processed_moves_mut()
                .remove_processed_moves(ack - history);
        }
    }

    fn respawn_cats(&mut self) {
        let now = self.timing.time();
        let due: Vec<PlayerId> = self
            .sessions
            .iter_mut()
            .filter_map(|session| session.take_respawn_due(now).then_some(session.player_id))
            .collect();

        for player_id in due {
            if let Some(session) = self.sessions.get_mut(player_id) {
                // Moves buffered while dead are not replayed on the new cat.
                session.unprocessed_moves_mut().clear();
            }
            let network_id = self.spawn_player_cat(player_id);
            self.pending_events.push_back(ServerEvent::CatRespawned {
                player_id,
                network_id,
            });
        }
    }

    fn spawn_player_cat(&mut self, player_id: PlayerId) -> NetworkId {
        let color = self
            .scores
            .entry(player_id)
            .map_or(Vec3::ONE, |entry| entry.color);

        spawn_cat(
            &mut self.world,
            &mut self.dirty,
            self.controller.config(),
            Some(player_id),
            ControlType::Human,
            Vec3::new(1.0 - player_id as f32, 0.0, 0.0),
            color,
        )
    }

    fn spawn_ai_cats(&mut self) {
        let count = self.config.ai_cats;
        let config = self.controller.config();
        let spacing = 2.0 * config.half_world_width / (count + 1) as f32;
        let y = config.half_world_height / 2.0;

        for i in 0..count {
            let x = -config.half_world_width + spacing * (i + 1) as f32;
            let network_id = spawn_cat(
                &mut self.world,
                &mut self.dirty,
                config,
                None,
                ControlType::Ai,
                Vec3::new(x, y, 0.0),
                AI_COLOR,
            );
            log::info!("spawned AI cat {}", network_id);
        }
    }

    fn drop_timed_out(&mut self) {
        for session in self.sessions.cleanup_timed_out() {
            self.remove_player(session.player_id);
            self.pending_events.push_back(ServerEvent::PlayerLeft {
                player_id: session.player_id,
                reason: DisconnectReason::Timeout,
            });
        }
    }

    fn remove_player(&mut self, player_id: PlayerId) {
        self.scores.remove_entry(player_id);
        if let Some(cat) = self.world.cat_for_player_mut(player_id) {
            cat.wants_to_die = true;
        }
    }

    fn process_network(&mut self) -> io::Result<()> {
        let packets = self.endpoint.receive()?;

        for (packet, addr) in packets {
            self.handle_packet(packet, addr);
        }

        Ok(())
    }

    fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet.payload {
            PacketType::Hello { name } => self.handle_hello(addr, name),
            PacketType::Input { moves } => self.handle_input(addr, moves),
            PacketType::Disconnect => self.handle_disconnect(addr),
            other => log::debug!("unexpected packet from {}: {:?}", addr, other),
        }

        if let Some(session) = self.sessions.get_by_addr_mut(&addr) {
            session.touch();
        }
    }

    fn handle_hello(&mut self, addr: SocketAddr, name: String) {
        let name: String = name.chars().take(MAX_NAME_LEN).collect();

        let (player_id, created) = match self.sessions.get_or_create(addr, &name) {
            Ok((session, created)) => (session.player_id, created),
            Err(e) => {
                self.pending_events.push_back(ServerEvent::JoinDenied {
                    addr,
                    reason: e.to_string(),
                });
                return;
            }
        };

        if created {
            self.scores.add_entry(player_id, &name);
            let network_id = self.spawn_player_cat(player_id);

            // The newcomer needs the full world, not just this tick's changes.
            let ids: Vec<NetworkId> = self.world.entities().iter().map(|e| e.network_id).collect();
            for id in ids {
                self.dirty.set_dirty(id, DirtyState::all());
            }

            self.pending_events.push_back(ServerEvent::PlayerJoined {
                player_id,
                name,
                addr,
                network_id,
            });
        }

        // Resent on duplicate hellos in case the first welcome was lost.
        self.endpoint.send_packet(PacketType::Welcome { player_id }, addr);
    }

    fn handle_input(&mut self, addr: SocketAddr, moves: Vec<MoveRecord>) {
        let Some(session) = self.sessions.get_by_addr_mut(&addr) else {
            log::debug!("input from unknown address {}", addr);
            return;
        };
        session.receive_moves(moves);
    }

    fn handle_disconnect(&mut self, addr: SocketAddr) {
        if let Some(session) = self.sessions.remove_by_addr(&addr) {
            self.remove_player(session.player_id);
            self.pending_events.push_back(ServerEvent::PlayerLeft {
                player_id: session.player_id,
                reason: DisconnectReason::Graceful,
            });
        }
    }
}
