mod entity;
mod hyper_yarn;
mod registry;

pub use entity::{Cat, ControlType, Entity, EntityKind, EntityType, NetworkId, PlayerId, Yarn};
pub use hyper_yarn::{HyperYarn, HyperYarnReplica};
pub use registry::{Simulate, World};
