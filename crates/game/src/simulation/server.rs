use crate::net::{DirtyState, DirtyTracker, PacketSink, SessionTable};
use crate::player::CatController;
use crate::score::ScoreBoard;
use crate::world::{Entity, EntityType, HyperYarn, PlayerId, Simulate, World};

use super::tick::Timing;
use super::{cat, projectile};

/// Everything the authoritative update needs besides the world itself. Built
/// by the run loop for each tick and dropped right after.
pub struct ServerSimulation<'a> {
    pub timing: &'a Timing,
    pub controller: &'a CatController,
    pub sessions: &'a mut SessionTable,
    pub scores: &'a mut ScoreBoard,
    pub dirty: &'a mut DirtyTracker,
    pub sink: &'a mut dyn PacketSink,
}

impl ServerSimulation<'_> {
    /// Applies one hit to the cat at `index`. Health is always marked dirty;
    /// the death bookkeeping runs only on the hit that takes health to zero.
    pub fn take_damage(&mut self, world: &mut World, index: usize, attacker: Option<PlayerId>) {
        let controller = self.controller;
        let config = controller.config();
        let now = self.timing.time();

        let entity = world.entity_mut(index);
        let network_id = entity.network_id;
        let victim = entity.player_id;
        let Some(cat) = entity.as_cat_mut() else {
            return;
        };

        let was_alive = cat.health > 0;
        cat.health -= config.damage_per_hit;
        let killed = was_alive && cat.health <= 0;

        if killed {
            entity.wants_to_die = true;

            if let Some(attacker) = attacker {
                self.scores.inc_score(attacker, 1);
            }
            if let Some(session) = victim.and_then(|id| self.sessions.get_mut(id)) {
                session.handle_cat_died(now, config.respawn_delay);
            }

            log::info!(
                "cat {} (player {:?}) killed by player {:?}",
                network_id,
                victim,
                attacker
            );
        }

        self.dirty.set_dirty(network_id, DirtyState::HEALTH);
    }
}

impl Simulate for ServerSimulation<'_> {
    fn update_entity(&mut self, world: &mut World, index: usize) {
        let entity_type = world.entity(index).entity_type();
        match entity_type {
            EntityType::Cat => cat::update_cat(self, world, index),
            EntityType::Yarn => projectile::update_yarn(self, world, index),
        }
    }

    fn handle_dying(&mut self, entity: &Entity) {
        log::debug!("entity {} left the world", entity.network_id);
        self.dirty.unregister(entity.network_id);
    }

    fn update_hyper_yarn(&mut self, yarn: &mut HyperYarn) {
        yarn.update(self.timing.delta_time());
    }
}
