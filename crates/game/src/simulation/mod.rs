mod cat;
mod input;
mod moves;
mod projectile;
mod server;
mod tick;

pub use cat::spawn_cat;
pub use input::InputState;
pub use moves::{Move, MoveList};
pub use server::ServerSimulation;
pub use tick::{FixedTimestep, Timing};
