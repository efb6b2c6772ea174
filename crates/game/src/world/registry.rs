use super::entity::{Entity, NetworkId, PlayerId};
use super::hyper_yarn::HyperYarn;

pub trait Simulate {
    /// Advances the entity at `index`. Implementations may read or mutate any
    /// entity, spawn new ones or add traces, but must not remove entities.
    fn update_entity(&mut self, world: &mut World, index: usize);

    fn handle_dying(&mut self, entity: &Entity);

    fn update_hyper_yarn(&mut self, yarn: &mut HyperYarn);
}

#[derive(Debug)]
pub struct World {
    entities: Vec<Entity>,
    hyper_yarns: Vec<HyperYarn>,
    next_network_id: NetworkId,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            hyper_yarns: Vec::new(),
            next_network_id: 1,
        }
    }

    pub fn add_entity(&mut self, mut entity: Entity) -> NetworkId {
        if entity.network_id == 0 {
            entity.network_id = self.allocate_id();
        } else if entity.network_id >= self.next_network_id {
            self.next_network_id = entity.network_id + 1;
        }

        let network_id = entity.network_id;
        entity.index_in_world = Some(self.entities.len());
        self.entities.push(entity);
        network_id
    }

    pub fn remove_entity(&mut self, index: usize) -> Entity {
        let mut removed = self.entities.swap_remove(index);
        if let Some(moved) = self.entities.get_mut(index) {
            moved.index_in_world = Some(index);
        }
        removed.index_in_world = None;
        removed
    }

    pub fn add_hyper_yarn(&mut self, yarn: HyperYarn) {
        self.hyper_yarns.push(yarn);
    }

    pub fn update<S: Simulate>(&mut self, sim: &mut S) {
        let mut i = 0;
        let mut count = self.entities.len();
        while i < count {
            if !self.entities[i].wants_to_die {
                sim.update_entity(self, i);
            }

            // The update itself may have flagged the entity.
            if self.entities[i].wants_to_die {
                // Swap with the last entity of this pass first so that anything
                // spawned during the pass stays at the tail.
                let last = count - 1;
                if i != last {
                    self.entities.swap(i, last);
                    self.entities[i].index_in_world = Some(i);
                }
                let dead = self.remove_entity(last);
                sim.handle_dying(&dead);
                // Slot `i` now holds an entity that has not been visited yet.
                count -= 1;
            } else {
                i += 1;
            }
        }

        self.hyper_yarns.retain_mut(|yarn| {
            if !yarn.is_active() {
                return false;
            }
            sim.update_hyper_yarn(yarn);
            true
        });
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    pub fn entity_mut(&mut self, index: usize) -> &mut Entity {
        &mut self.entities[index]
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    pub fn get_by_network_id(&self, network_id: NetworkId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.network_id == network_id)
    }

    pub fn get_by_network_id_mut(&mut self, network_id: NetworkId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.network_id == network_id)
    }

    pub fn cat_for_player(&self, player_id: PlayerId) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.is_cat() && e.player_id == Some(player_id))
    }

    pub fn cat_for_player_mut(&mut self, player_id: PlayerId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|e| e.is_cat() && e.player_id == Some(player_id))
    }

    pub fn hyper_yarns(&self) -> &[HyperYarn] {
        &self.hyper_yarns
    }

    pub fn active_hyper_yarns(&self) -> impl Iterator<Item = &HyperYarn> {
        self.hyper_yarns.iter().filter(|y| y.is_active())
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn allocate_id(&mut self) -> NetworkId {
        let id = self.next_network_id;
        self.next_network_id += 1;
        id
    }
}
