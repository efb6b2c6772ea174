use glam::Vec3;

use crate::simulation::InputState;
use crate::world::Entity;

use super::CatConfig;

/// Turns inputs into cat motion. Everything here depends only on the entity,
/// the input and `dt`, so replaying the same moves reproduces the same pose.
pub struct CatController {
    config: CatConfig,
}

impl Default for CatController {
    fn default() -> Self {
        Self::new(CatConfig::default())
    }
}

impl CatController {
    pub fn new(config: CatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CatConfig {
        &self.config
    }

    pub fn process_input(&self, entity: &mut Entity, input: &InputState, dt: f32) {
        let Some(cat) = entity.as_cat_mut() else {
            return;
        };

        cat.thrust_dir = input.vertical_delta();
        cat.is_shooting = input.is_shooting;
        cat.is_hyper_shooting = input.is_hyper_shooting;

        entity.rotation += input.horizontal_delta() * self.config.max_rotation_speed * dt;
    }

    pub fn simulate_movement(&self, entity: &mut Entity, dt: f32) {
        let thrust = entity.as_cat().map_or(0.0, |cat| cat.thrust_dir);

        entity.velocity = entity.forward_vector() * (thrust * self.config.max_linear_speed);
        entity.location += entity.velocity * dt;

        self.process_wall_collisions(entity);
    }

    fn process_wall_collisions(&self, entity: &mut Entity) {
        let radius = entity.collision_radius;
        let restitution = self.config.wall_restitution;
        let max = Vec3::new(
            self.config.half_world_width - radius,
            self.config.half_world_height - radius,
            f32::INFINITY,
        );
        let min = -max;

        let location = &mut entity.location;
        let velocity = &mut entity.velocity;

        if location.y >= max.y && velocity.y > 0.0 {
            velocity.y = -velocity.y * restitution;
            location.y = max.y;
        } else if location.y <= min.y && velocity.y < 0.0 {
            velocity.y = -velocity.y * restitution;
            location.y = min.y;
        }

        if location.x >= max.x && velocity.x > 0.0 {
            velocity.x = -velocity.x * restitution;
            location.x = max.x;
        } else if location.x <= min.x && velocity.x < 0.0 {
            velocity.x = -velocity.x * restitution;
            location.x = min.x;
        }
    }
}
