use crate::net::DirtyState;
use crate::player::CatConfig;
use crate::world::{Entity, EntityKind, World};

use super::server::ServerSimulation;

/// Builds a yarn ball leaving `shooter`'s muzzle at `now`. The caller
/// registers it.
pub(crate) fn spawn_from_shooter(shooter: &Entity, now: f32, config: &CatConfig) -> Entity {
    let mut yarn = Entity::yarn(
        shooter.player_id,
        now + config.yarn_lifetime,
        config.yarn_radius,
    )
    .at(shooter.location)
    .facing(shooter.rotation);

    yarn.velocity = shooter.velocity + shooter.forward_vector() * config.yarn_muzzle_speed;
    yarn.color = shooter.color;
    yarn
}

pub(super) fn update_yarn(sim: &mut ServerSimulation<'_>, world: &mut World, index: usize) {
    let dt = sim.timing.delta_time();
    let now = sim.timing.frame_start_time();

    let yarn = world.entity_mut(index);
    let EntityKind::Yarn(state) = &yarn.kind else {
        return;
    };
    let time_to_die = state.time_to_die;

    yarn.location += yarn.velocity * dt;
    sim.dirty.set_dirty(yarn.network_id, DirtyState::POSE);

    if now > time_to_die {
        yarn.wants_to_die = true;
        return;
    }

    let owner = yarn.player_id;
    let location = yarn.location;
    let radius = yarn.collision_radius;

    let victim = world.entities().iter().position(|target| {
        target.is_cat()
            && !target.wants_to_die
            && (owner.is_none() || target.player_id != owner)
            && target.location.truncate().distance(location.truncate())
                <= target.collision_radius + radius
    });

    if let Some(victim) = victim {
        sim.take_damage(world, victim, owner);
        world.entity_mut(index).wants_to_die = true;
    }
}
