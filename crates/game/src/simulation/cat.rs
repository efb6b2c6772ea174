use glam::{Quat, Vec3};

use crate::net::{DirtyState, DirtyTracker, PacketType};
use crate::player::CatConfig;
use crate::world::{ControlType, Entity, HyperYarn, NetworkId, PlayerId, World};

use super::input::InputState;
use super::moves::Move;
use super::projectile;
use super::server::ServerSimulation;

const POSE_EPSILON: f32 = 1e-4;

fn is_2d_vector_equal(a: Vec3, b: Vec3) -> bool {
    (a.x - b.x).abs() < POSE_EPSILON && (a.y - b.y).abs() < POSE_EPSILON
}

/// Creates a cat, registers it and marks it for a full initial replication.
pub fn spawn_cat(
    world: &mut World,
    dirty: &mut DirtyTracker,
    config: &CatConfig,
    player_id: Option<PlayerId>,
    control: ControlType,
    location: Vec3,
    color: Vec3,
) -> NetworkId {
    let mut cat = Entity::cat(
        player_id,
        control,
        config.starting_health,
        config.collision_radius,
    )
    .at(location);
    cat.color = color;

    let network_id = world.add_entity(cat);
    dirty.set_dirty(network_id, DirtyState::all());
    network_id
}

pub(super) fn update_cat(sim: &mut ServerSimulation<'_>, world: &mut World, index: usize) {
    let entity = world.entity(index);
    let Some(control) = entity.as_cat().map(|cat| cat.control) else {
        return;
    };
    let network_id = entity.network_id;
    let player_id = entity.player_id;
    let old_location = entity.location;
    let old_velocity = entity.velocity;
    let old_rotation = entity.rotation;

    match (control, player_id) {
        (ControlType::Human, Some(player_id)) => replay_moves(sim, world, index, player_id),
        (ControlType::Human, None) => {}
        (ControlType::Ai, _) => {
            // No AI yet; keep coasting on whatever thrust is set.
            let dt = sim.timing.delta_time();
            sim.controller.simulate_movement(world.entity_mut(index), dt);
        }
    }

    handle_shooting(sim, world, index);

    let entity = world.entity(index);
    if !is_2d_vector_equal(old_location, entity.location)
        || !is_2d_vector_equal(old_velocity, entity.velocity)
        || old_rotation != entity.rotation
    {
        sim.dirty.set_dirty(network_id, DirtyState::POSE);
    }
}

/// Resimulates every buffered move with its own delta, then moves it to the
/// processed list. The whole backlog is consumed in one go.
fn replay_moves(
    sim: &mut ServerSimulation<'_>,
    world: &mut World,
    index: usize,
    player_id: PlayerId,
) {
    let Some(session) = sim.sessions.get(player_id) else {
        return;
    };
    let moves: Vec<Move> = session.unprocessed_moves().iter().copied().collect();

    for mv in &moves {
        let dt = mv.delta_time();
        process_input(sim, world, index, player_id, mv.input_state(), dt);
        sim.controller.simulate_movement(world.entity_mut(index), dt);

        log::trace!(
            "player {} move at {:.4} dt {:.4} rotation {:.4}",
            player_id,
            mv.timestamp(),
            dt,
            world.entity(index).rotation
        );

        if let Some(session) = sim.sessions.get_mut(player_id) {
            session.mark_processed(mv);
        }
    }

    if let Some(session) = sim.sessions.get_mut(player_id) {
        session.unprocessed_moves_mut().clear();
    }
}

fn process_input(
    sim: &mut ServerSimulation<'_>,
    world: &mut World,
    index: usize,
    player_id: PlayerId,
    input: &InputState,
    dt: f32,
) {
    sim.controller.process_input(world.entity_mut(index), input, dt);

    if input.is_hyper_shooting {
        fire_hyper_yarn(sim, world, index, player_id);
    }
}

/// Resolves a hyper yarn shot against the current positions and reports the
/// outcome straight to the shooter, outside of the regular state flush.
fn fire_hyper_yarn(
    sim: &mut ServerSimulation<'_>,
    world: &mut World,
    index: usize,
    player_id: PlayerId,
) {
    let controller = sim.controller;
    let config = controller.config();
    let now = sim.timing.time();

    let Some(session) = sim.sessions.get_mut(player_id) else {
        return;
    };
    if !session.can_hyper_shoot(now, config.hyper_yarn_cooldown) {
        return;
    }
    session.set_last_hyper_yarn_shot_time(now);
    let addr = session.addr;

    let shooter = world.entity(index);
    let shooter_player = shooter.player_id;

    let mut yarn = HyperYarn::with_cooldown(config.hyper_yarn_cooldown);
    yarn.set_points(
        shooter.location,
        shooter.location + shooter.forward_vector() * config.hyper_yarn_length,
    );
    yarn.set_rotation(Quat::from_rotation_z(shooter.rotation));

    let hit = world
        .entities()
        .iter()
        .enumerate()
        .filter(|(i, target)| {
            *i != index
                && target.is_cat()
                && target.player_id != shooter_player
        })
        // TODO: rewind each target to the shooter's view time before testing
        // once processed-move history is used for lag compensation.
        .any(|(_, target)| yarn.intersects_entity(target));
    yarn.mark_evaluated();

    log::debug!(
        "player {} fired hyper yarn {} ({})",
        player_id,
        yarn.id(),
        if hit { "hit" } else { "miss" }
    );

    world.add_hyper_yarn(yarn);
    sim.sink.send_packet(PacketType::HyperYarnResult { hit }, addr);
}

fn handle_shooting(sim: &mut ServerSimulation<'_>, world: &mut World, index: usize) {
    let controller = sim.controller;
    let config = controller.config();
    let now = sim.timing.frame_start_time();

    let entity = world.entity_mut(index);
    let Some(cat) = entity.as_cat_mut() else {
        return;
    };
    if !cat.is_shooting || now <= cat.time_of_next_shot {
        return;
    }
    cat.time_of_next_shot = now + config.time_between_shots;

    let yarn = projectile::spawn_from_shooter(entity, now, config);
    let network_id = world.add_entity(yarn);
    sim.dirty.set_dirty(network_id, DirtyState::all());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_equality_uses_xy_epsilon() {
        let a = Vec3::new(1.0, 2.0, 0.0);

        assert!(is_2d_vector_equal(a, Vec3::new(1.0 + POSE_EPSILON / 2.0, 2.0, 9.0)));
        assert!(!is_2d_vector_equal(a, Vec3::new(1.0, 2.001, 0.0)));
    }
}
