use std::net::SocketAddr;

use glam::Vec3;
use robocat::{
    CatConfig, CatController, ControlType, DirtyState, DirtyTracker, InputState, MoveRecord,
    NetworkId, Outbox, PacketType, PlayerId, ScoreBoard, ServerSimulation, SessionTable, Timing,
    World, spawn_cat,
};

const DT: f32 = 1.0 / 30.0;

struct Harness {
    world: World,
    timing: Timing,
    controller: CatController,
    sessions: SessionTable,
    scores: ScoreBoard,
    dirty: DirtyTracker,
    outbox: Outbox,
}

impl Harness {
    fn new() -> Self {
        Self {
            world: World::new(),
            timing: Timing::new(),
            controller: CatController::new(CatConfig::default()),
            sessions: SessionTable::new(8),
            scores: ScoreBoard::new(),
            dirty: DirtyTracker::new(),
            outbox: Outbox::new(),
        }
    }

    fn join(&mut self, port: u16, name: &str, location: Vec3) -> (PlayerId, NetworkId) {
        let addr = addr(port);
        let (session, created) = self.sessions.get_or_create(addr, name).unwrap();
        assert!(created);
        let player_id = session.player_id;
        self.scores.add_entry(player_id, name);
        let network_id = spawn_cat(
            &mut self.world,
            &mut self.dirty,
            self.controller.config(),
            Some(player_id),
            ControlType::Human,
            location,
            Vec3::ONE,
        );
        (player_id, network_id)
    }

    fn send_moves(&mut self, player_id: PlayerId, moves: &[(InputState, f32)]) -> usize {
        let records = moves.iter().map(|&(input, timestamp)| MoveRecord { input, timestamp });
        self.sessions
            .get_mut(player_id)
            .unwrap()
            .receive_moves(records)
    }

    fn tick(&mut self) {
        self.timing.advance(DT);
        let mut sim = ServerSimulation {
            timing: &self.timing,
            controller: &self.controller,
            sessions: &mut self.sessions,
            scores: &mut self.scores,
            dirty: &mut self.dirty,
            sink: &mut self.outbox,
        };
        self.world.update(&mut sim);
    }

    fn hit(&mut self, network_id: NetworkId, attacker: Option<PlayerId>) {
        let index = self
            .world
            .get_by_network_id(network_id)
            .and_then(|e| e.index_in_world())
            .unwrap();
        let mut sim = ServerSimulation {
            timing: &self.timing,
            controller: &self.controller,
            sessions: &mut self.sessions,
            scores: &mut self.scores,
            dirty: &mut self.dirty,
            sink: &mut self.outbox,
        };
        sim.take_damage(&mut self.world, index, attacker);
    }

    fn health(&self, network_id: NetworkId) -> Option<i32> {
        self.world.get_by_network_id(network_id).and_then(|e| e.health())
    }

    fn hyper_results(&mut self) -> Vec<(SocketAddr, bool)> {
        self.outbox
            .drain()
            .filter_map(|(addr, packet)| match packet.payload {
                PacketType::HyperYarnResult { hit } => Some((addr, hit)),
                _ => None,
            })
            .collect()
    }
}

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[test]
fn redundant_moves_are_replayed_once() {
    let mut h = Harness::new();
    let (player, cat) = h.join(5000, "ginger", Vec3::ZERO);
    h.dirty.take();

    let thrust = InputState::new().with_thrust(1.0);
    let accepted = h.send_moves(
        player,
        &[(thrust, 0.1), (thrust, 0.2), (thrust, 0.2), (thrust, 0.15), (thrust, 0.3)],
    );
    assert_eq!(accepted, 3);

    h.tick();

    let session = h.sessions.get(player).unwrap();
    assert!(!session.unprocessed_moves().has_moves());
    assert_eq!(session.unprocessed_moves().last_timestamp(), 0.3);
    assert_eq!(session.processed_moves().len(), 3);

    // First move has no delta, the other two cover 0.2 s at 2 units/s.
    let entity = h.world.get_by_network_id(cat).unwrap();
    assert!((entity.location.y + 0.4).abs() < 1e-4);
    assert!(h.dirty.is_dirty(cat, DirtyState::POSE));

    // A stale move arriving after the backlog was consumed is still rejected.
    assert_eq!(h.send_moves(player, &[(thrust, 0.25)]), 0);
}

#[test]
fn idle_cat_raises_no_pose_flag() {
    let mut h = Harness::new();
    spawn_cat(
        &mut h.world,
        &mut h.dirty,
        h.controller.config(),
        None,
        ControlType::Ai,
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::ONE,
    );
    h.dirty.take();

    h.tick();

    assert!(h.dirty.is_empty());
}

#[test]
fn turning_in_place_raises_pose_flag() {
    let mut h = Harness::new();
    let (player, cat) = h.join(5000, "ginger", Vec3::ZERO);
    h.dirty.take();

    let turn = InputState::new().with_turn(1.0);
    h.send_moves(player, &[(turn, 0.1), (turn, 0.2)]);
    h.tick();

    let entity = h.world.get_by_network_id(cat).unwrap();
    assert_ne!(entity.rotation, 0.0);
    assert_eq!(entity.location, Vec3::ZERO);
    assert_eq!(h.dirty.get(cat), DirtyState::POSE);
}

#[test]
fn non_lethal_hit_only_lowers_health() {
    let mut h = Harness::new();
    let (shooter, _) = h.join(5000, "shooter", Vec3::ZERO);
    let (victim, victim_cat) = h.join(5001, "victim", Vec3::new(3.0, 0.0, 0.0));
    h.dirty.take();

    h.hit(victim_cat, Some(shooter));

    let config = CatConfig::default();
    assert_eq!(
        h.health(victim_cat),
        Some(config.starting_health - config.damage_per_hit)
    );
    assert_eq!(h.dirty.get(victim_cat), DirtyState::HEALTH);
    assert_eq!(h.scores.entry(shooter).map(|e| e.score), Some(0));
    assert!(!h.world.get_by_network_id(victim_cat).unwrap().wants_to_die);
    assert!(!h.sessions.get(victim).unwrap().is_awaiting_respawn());
}

#[test]
fn overkill_scores_only_once() {
    let mut h = Harness::new();
    let (shooter, _) = h.join(5000, "shooter", Vec3::ZERO);
    let (victim, victim_cat) = h.join(5001, "victim", Vec3::new(3.0, 0.0, 0.0));
    h.world
        .get_by_network_id_mut(victim_cat)
        .and_then(|e| e.as_cat_mut())
        .unwrap()
        .health = 1;
    h.dirty.take();

    h.hit(victim_cat, Some(shooter));
    h.hit(victim_cat, Some(shooter));

    assert_eq!(h.health(victim_cat), Some(-1));
    assert_eq!(h.scores.entry(shooter).map(|e| e.score), Some(1));
    assert!(h.world.get_by_network_id(victim_cat).unwrap().wants_to_die);
    assert!(h.sessions.get(victim).unwrap().is_awaiting_respawn());
    assert!(h.dirty.is_dirty(victim_cat, DirtyState::HEALTH));
}

#[test]
fn hyper_yarn_reports_hit_and_respects_cooldown() {
    let mut h = Harness::new();
    let (shooter, _) = h.join(5000, "shooter", Vec3::ZERO);
    let (_, target) = h.join(5001, "target", Vec3::new(0.0, -2.0, 0.0));

    let hyper = InputState::new().with_hyper_shooting(true);
    h.send_moves(shooter, &[(hyper, 0.1)]);
    h.tick();

    assert_eq!(h.hyper_results(), vec![(addr(5000), true)]);
    assert_eq!(h.world.hyper_yarns().len(), 1);
    assert!(h.world.hyper_yarns()[0].is_evaluated());

    // The hit scan reports only; it deals no damage.
    let health = h.world.get_by_network_id(target).and_then(|e| e.health());
    assert_eq!(health, Some(CatConfig::default().starting_health));

    h.send_moves(shooter, &[(hyper, 0.2)]);
    h.tick();
    assert!(h.hyper_results().is_empty());
    assert_eq!(h.world.hyper_yarns().len(), 1);
}

#[test]
fn hyper_yarn_miss_is_reported_too() {
    let mut h = Harness::new();
    let (shooter, _) = h.join(5000, "shooter", Vec3::ZERO);
    h.join(5001, "bystander", Vec3::new(2.0, -2.0, 0.0));

    h.send_moves(shooter, &[(InputState::new().with_hyper_shooting(true), 0.1)]);
    h.tick();

    assert_eq!(h.hyper_results(), vec![(addr(5000), false)]);
}

#[test]
fn hyper_yarn_ignores_cats_of_the_same_player() {
    let mut h = Harness::new();
    let (shooter, _) = h.join(5000, "shooter", Vec3::ZERO);
    spawn_cat(
        &mut h.world,
        &mut h.dirty,
        h.controller.config(),
        Some(shooter),
        ControlType::Human,
        Vec3::new(0.0, -2.0, 0.0),
        Vec3::ONE,
    );

    h.send_moves(shooter, &[(InputState::new().with_hyper_shooting(true), 0.1)]);
    h.tick();

    assert_eq!(h.hyper_results(), vec![(addr(5000), false)]);
}

#[test]
fn traces_leave_the_world_after_their_cooldown() {
    let mut h = Harness::new();
    let (shooter, _) = h.join(5000, "shooter", Vec3::ZERO);

    h.send_moves(shooter, &[(InputState::new().with_hyper_shooting(true), 0.1)]);
    h.tick();
    assert_eq!(h.world.hyper_yarns().len(), 1);

    let cooldown = CatConfig::default().hyper_yarn_cooldown;
    let ticks = (cooldown / DT).ceil() as usize + 2;
    for _ in 0..ticks {
        h.tick();
    }

    assert!(h.world.hyper_yarns().is_empty());
}

#[test]
fn yarn_kills_cat_and_scores_for_owner() {
    let mut h = Harness::new();
    let (shooter, shooter_cat) = h.join(5000, "shooter", Vec3::ZERO);
    let (victim, victim_cat) = h.join(5001, "victim", Vec3::new(0.0, -0.5, 0.0));

    h.world
        .get_by_network_id_mut(victim_cat)
        .and_then(|e| e.as_cat_mut())
        .unwrap()
        .health = 1;

    h.send_moves(shooter, &[(InputState::new().with_shooting(true), 0.1)]);
    h.tick();

    // Projectile spawned this tick and was not updated yet.
    assert_eq!(h.world.entity_count(), 3);
    let yarn = h
        .world
        .entities()
        .iter()
        .find(|e| !e.is_cat())
        .map(|e| e.network_id)
        .unwrap();
    assert_eq!(h.dirty.get(yarn), DirtyState::all());

    h.tick();

    assert_eq!(h.scores.entry(shooter).map(|e| e.score), Some(1));
    assert!(h.sessions.get(victim).unwrap().is_awaiting_respawn());
    assert!(h.dirty.is_dirty(victim_cat, DirtyState::HEALTH));
    // The yarn died in the same pass; the cat was flagged after its own update.
    assert!(h.world.get_by_network_id(yarn).is_none());
    assert!(h.world.get_by_network_id(victim_cat).is_some());

    h.tick();
    assert!(h.world.get_by_network_id(victim_cat).is_none());
    assert!(h.world.get_by_network_id(yarn).is_none());
    assert!(h.world.get_by_network_id(shooter_cat).is_some());

    let batch = h.dirty.take();
    assert!(batch.destroyed.contains(&victim_cat));
    assert!(batch.destroyed.contains(&yarn));
}

#[test]
fn yarn_expires_without_a_target() {
    let mut h = Harness::new();
    let (shooter, _) = h.join(5000, "shooter", Vec3::new(0.0, 3.0, 0.0));

    h.send_moves(shooter, &[(InputState::new().with_shooting(true), 0.1)]);
    h.tick();
    h.send_moves(shooter, &[(InputState::new(), 0.2)]);
    assert_eq!(h.world.entity_count(), 2);

    let lifetime = CatConfig::default().yarn_lifetime;
    let ticks = (lifetime / DT).ceil() as usize + 2;
    for _ in 0..ticks {
        h.tick();
    }

    assert_eq!(h.world.entity_count(), 1);
}
