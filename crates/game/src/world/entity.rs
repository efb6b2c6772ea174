use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::net::EntityState;

pub type NetworkId = u32;
pub type PlayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum EntityType {
    #[default]
    Cat = 0,
    Yarn = 1,
}

impl From<u8> for EntityType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Yarn,
            _ => Self::Cat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlType {
    #[default]
    Human,
    Ai,
}

/// Cat-specific simulation state.
#[derive(Debug, Clone)]
pub struct Cat {
    pub control: ControlType,
    pub health: i32,
    pub thrust_dir: f32,
    pub is_shooting: bool,
    pub is_hyper_shooting: bool,
    pub time_of_next_shot: f32,
}

impl Cat {
    pub fn new(control: ControlType, health: i32) -> Self {
        Self {
            control,
            health,
            thrust_dir: 0.0,
            is_shooting: false,
            is_hyper_shooting: false,
            time_of_next_shot: 0.0,
        }
    }
}

/// A thrown ball of yarn.
#[derive(Debug, Clone)]
pub struct Yarn {
    pub time_to_die: f32,
}

#[derive(Debug, Clone)]
pub enum EntityKind {
    Cat(Cat),
    Yarn(Yarn),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub network_id: NetworkId,
    pub player_id: Option<PlayerId>,
    pub location: Vec3,
    pub velocity: Vec3,
    pub rotation: f32,
    pub color: Vec3,
    pub collision_radius: f32,
    pub wants_to_die: bool,
    pub(crate) index_in_world: Option<usize>,
    pub kind: EntityKind,
}

impl Entity {
    fn with_kind(kind: EntityKind, collision_radius: f32) -> Self {
        Self {
            network_id: 0,
            player_id: None,
            location: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: 0.0,
            color: Vec3::ONE,
            collision_radius,
            wants_to_die: false,
            index_in_world: None,
            kind,
        }
    }

    pub fn cat(player_id: Option<PlayerId>, control: ControlType, health: i32, radius: f32) -> Self {
        let mut entity = Self::with_kind(EntityKind::Cat(Cat::new(control, health)), radius);
        entity.player_id = player_id;
        entity
    }

    pub fn yarn(player_id: Option<PlayerId>, time_to_die: f32, radius: f32) -> Self {
        let mut entity = Self::with_kind(EntityKind::Yarn(Yarn { time_to_die }), radius);
        entity.player_id = player_id;
        entity
    }

    pub fn at(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    pub fn facing(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Cat(_) => EntityType::Cat,
            EntityKind::Yarn(_) => EntityType::Yarn,
        }
    }

    pub fn index_in_world(&self) -> Option<usize> {
        self.index_in_world
    }

    pub fn as_cat(&self) -> Option<&Cat> {
        match &self.kind {
            EntityKind::Cat(cat) => Some(cat),
            _ => None,
        }
    }

    pub fn as_cat_mut(&mut self) -> Option<&mut Cat> {
        match &mut self.kind {
            EntityKind::Cat(cat) => Some(cat),
            _ => None,
        }
    }

    pub fn is_cat(&self) -> bool {
        matches!(self.kind, EntityKind::Cat(_))
    }

    pub fn health(&self) -> Option<i32> {
        self.as_cat().map(|cat| cat.health)
    }

    /// Unit vector the entity is facing in the XY plane.
    pub fn forward_vector(&self) -> Vec3 {
        Vec3::new(self.rotation.sin(), -self.rotation.cos(), 0.0)
    }

    pub fn to_network_state(&self) -> EntityState {
        EntityState {
            network_id: self.network_id,
            entity_type: self.entity_type() as u8,
            player_id: self.player_id.unwrap_or(0),
            location: self.location.into(),
            velocity: self.velocity.into(),
            rotation: self.rotation,
            color: self.color.into(),
            health: self.health().unwrap_or(0),
            dirty: 0,
        }
    }
}
