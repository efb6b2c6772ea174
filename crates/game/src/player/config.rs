use serde::{Deserialize, Serialize};

use crate::world::HyperYarn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatConfig {
    pub max_linear_speed: f32,
    pub max_rotation_speed: f32,

    pub collision_radius: f32,
    pub wall_restitution: f32,

    pub half_world_width: f32,
    pub half_world_height: f32,

    pub starting_health: i32,
    pub damage_per_hit: i32,
    pub respawn_delay: f32,

    pub time_between_shots: f32,
    pub yarn_muzzle_speed: f32,
    pub yarn_lifetime: f32,
    pub yarn_radius: f32,

    pub hyper_yarn_cooldown: f32,
    pub hyper_yarn_length: f32,

    /// Seconds of processed moves kept per session after they were acked.
    pub processed_move_history: f32,
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            max_linear_speed: 2.0,
            max_rotation_speed: 5.0,

            collision_radius: 0.5,
            wall_restitution: 0.1,

            half_world_width: 6.4,
            half_world_height: 3.6,

            starting_health: 10,
            damage_per_hit: 1,
            respawn_delay: 3.0,

            time_between_shots: 0.2,
            yarn_muzzle_speed: 3.0,
            yarn_lifetime: 1.0,
            yarn_radius: 0.1,

            hyper_yarn_cooldown: HyperYarn::DEFAULT_COOLDOWN,
            hyper_yarn_length: 100.0,

            processed_move_history: 1.0,
        }
    }
}
