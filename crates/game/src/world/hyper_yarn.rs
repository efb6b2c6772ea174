use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Quat, Vec3};

use crate::net::{DirtyState, HyperYarnState};

use super::entity::Entity;

static NEXT_HYPER_YARN_ID: AtomicU32 = AtomicU32::new(1);

fn next_id() -> u32 {
    NEXT_HYPER_YARN_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn dot_2d(a: Vec3, b: Vec3) -> f32 {
    a.x * b.x + a.y * b.y
}

#[inline]
fn length_sq_2d(v: Vec3) -> f32 {
    dot_2d(v, v)
}

/// Instant line trace fired by a cat. The hit is resolved once, when the trace
/// is created; `cooldown` only controls how long the trace stays visible.
#[derive(Debug, Clone)]
pub struct HyperYarn {
    id: u32,
    rotation: Quat,
    origin: Vec3,
    hit_point: Vec3,
    color: Vec3,
    cooldown: f32,
    active: bool,
    // Server only, never read back by clients.
    evaluated: bool,
}

impl Default for HyperYarn {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperYarn {
    pub const DEFAULT_COOLDOWN: f32 = 2.0;
    pub const DEFAULT_COLOR: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub fn new() -> Self {
        Self::with_cooldown(Self::DEFAULT_COOLDOWN)
    }

    pub fn with_cooldown(cooldown: f32) -> Self {
        Self {
            id: next_id(),
            rotation: Quat::IDENTITY,
            origin: Vec3::ZERO,
            hit_point: Vec3::ZERO,
            color: Self::DEFAULT_COLOR,
            cooldown,
            active: true,
            evaluated: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn hit_point(&self) -> Vec3 {
        self.hit_point
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    pub fn set_points(&mut self, origin: Vec3, hit_point: Vec3) {
        self.origin = origin;
        self.hit_point = hit_point;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    pub fn set_color(&mut self, red: f32, green: f32, blue: f32) {
        self.color = Vec3::new(red, green, blue);
    }

    pub fn mark_evaluated(&mut self) {
        self.evaluated = true;
    }

    /// Counts the visible lifetime down. Once the cooldown runs out the trace
    /// is inactive for good and the next world sweep drops it.
    pub fn update(&mut self, delta_time: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= delta_time;
            if self.cooldown <= 0.0 {
                self.active = false;
            }
        }
    }

    /// 2D proximity test of a circle against the traced ray, ignoring Z.
    ///
    /// The projection is only rejected when it reaches past `hit_point`;
    /// there is no clamp at the origin end, so a target slightly behind the
    /// shooter can still register if it sits within `radius` of the line.
    pub fn intersects(&self, location: Vec3, radius: f32) -> bool {
        let ray = self.hit_point - self.origin;
        let ray_len_sq = length_sq_2d(ray);
        if ray_len_sq <= 0.0 {
            return false;
        }

        let offset = location - self.origin;
        let projected = ray * (dot_2d(offset, ray) / ray_len_sq);

        if length_sq_2d(projected) > ray_len_sq {
            return false;
        }

        length_sq_2d(offset - projected) <= radius * radius
    }

    pub fn intersects_entity(&self, target: &Entity) -> bool {
        self.intersects(target.location, target.collision_radius)
    }

    pub fn to_network_state(&self) -> HyperYarnState {
        HyperYarnState {
            id: self.id,
            rotation: self.rotation.to_array(),
            origin: self.origin.into(),
            hit_point: self.hit_point.into(),
            color: self.color.into(),
            cooldown: self.cooldown,
            active: self.active,
            evaluated: self.evaluated,
        }
    }

    /// Full-state write; traces are never delta compressed, so nothing is
    /// ever left over for a later flush.
    pub fn write(&self, out: &mut Vec<HyperYarnState>, _dirty: DirtyState) -> DirtyState {
        out.push(self.to_network_state());
        DirtyState::empty()
    }
}

/// Client-side view of a trace. It has no `evaluated` flag: that one stays on
/// the server even though it is part of the written record.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperYarnReplica {
    pub id: u32,
    pub rotation: Quat,
    pub origin: Vec3,
    pub hit_point: Vec3,
    pub color: Vec3,
    pub cooldown: f32,
    pub active: bool,
}

impl HyperYarnReplica {
    pub fn read(state: &HyperYarnState) -> Self {
        Self {
            id: state.id,
            rotation: Quat::from_array(state.rotation),
            origin: Vec3::from(state.origin),
            hit_point: Vec3::from(state.hit_point),
            color: Vec3::from(state.color),
            cooldown: state.cooldown,
            active: state.active,
        }
    }

    pub fn update(&mut self, delta_time: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= delta_time;
            if self.cooldown <= 0.0 {
                self.active = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_trace() -> HyperYarn {
        let mut yarn = HyperYarn::new();
        yarn.set_points(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        yarn
    }

    #[test]
    fn hits_target_on_the_ray() {
        let yarn = horizontal_trace();
        assert!(yarn.intersects(Vec3::new(5.0, 0.0, 0.0), 1.0));
        assert!(yarn.intersects(Vec3::new(5.0, 0.9, 0.0), 1.0));
    }

    #[test]
    fn misses_target_off_to_the_side() {
        let yarn = horizontal_trace();
        assert!(!yarn.intersects(Vec3::new(5.0, 5.0, 0.0), 1.0));
    }

    #[test]
    fn misses_target_past_the_far_end() {
        let yarn = horizontal_trace();
        assert!(!yarn.intersects(Vec3::new(15.0, 0.0, 0.0), 1.0));
    }

    #[test]
    fn ignores_vertical_axis() {
        let yarn = horizontal_trace();
        assert!(yarn.intersects(Vec3::new(5.0, 0.0, 50.0), 1.0));
    }

    #[test]
    fn near_end_is_not_clamped() {
        let yarn = horizontal_trace();
        assert!(yarn.intersects(Vec3::new(-0.5, 0.0, 0.0), 1.0));
    }

    #[test]
    fn degenerate_ray_never_hits() {
        let yarn = HyperYarn::new();
        assert!(!yarn.intersects(Vec3::ZERO, 1.0));
    }

    #[test]
    fn very_short_ray_still_hits() {
        let mut yarn = HyperYarn::new();
        yarn.set_points(Vec3::ZERO, Vec3::new(1e-4, 0.0, 0.0));
        assert!(yarn.intersects(Vec3::new(5e-5, 0.0, 0.0), 0.5));
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = HyperYarn::new();
        let b = HyperYarn::new();
        assert!(b.id() > a.id());
    }

    #[test]
    fn cooldown_deactivates_once() {
        let mut yarn = HyperYarn::with_cooldown(0.5);
        yarn.update(0.3);
        assert!(yarn.is_active());
        yarn.update(0.3);
        assert!(!yarn.is_active());
        yarn.update(0.3);
        assert!(!yarn.is_active());
    }

    #[test]
    fn write_emits_full_state_and_empty_mask() {
        let mut yarn = horizontal_trace();
        yarn.set_color(1.0, 0.5, 0.0);
        yarn.mark_evaluated();

        let mut out = Vec::new();
        let remaining = yarn.write(&mut out, DirtyState::all());

        assert!(remaining.is_empty());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, yarn.id());
        assert_eq!(out[0].hit_point, [10.0, 0.0, 0.0]);
        assert_eq!(out[0].color, [1.0, 0.5, 0.0]);
        assert!(out[0].evaluated);
    }

    #[test]
    fn replica_reads_everything_but_evaluated() {
        let mut yarn = horizontal_trace();
        yarn.mark_evaluated();
        let state = yarn.to_network_state();

        let mut replica = HyperYarnReplica::read(&state);
        assert_eq!(replica.id, yarn.id());
        assert_eq!(replica.hit_point, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(replica.color, HyperYarn::DEFAULT_COLOR);
        assert!(replica.active);

        replica.update(HyperYarn::DEFAULT_COOLDOWN);
        assert!(!replica.active);
    }
}
