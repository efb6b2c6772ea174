pub mod net;
pub mod player;
pub mod score;
pub mod simulation;
pub mod world;

pub use net::{
    ClientProxy, DEFAULT_PORT, DEFAULT_TICK_RATE, DirtyBatch, DirtyState, DirtyTracker,
    EntityState, HyperYarnState, MoveRecord, Outbox, Packet, PacketError, PacketHeader,
    PacketSink, PacketType, SessionError, SessionTable, StatePacket,
};
pub use player::{CatConfig, CatController};
pub use score::{ScoreBoard, ScoreEntry};
pub use simulation::{
    FixedTimestep, InputState, Move, MoveList, ServerSimulation, Timing, spawn_cat,
};
pub use world::{
    ControlType, Entity, EntityKind, EntityType, HyperYarn, HyperYarnReplica, NetworkId,
    PlayerId, Simulate, World,
};
