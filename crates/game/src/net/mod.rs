mod dirty;
mod protocol;
mod session;
mod sink;

pub use dirty::{DirtyBatch, DirtyState, DirtyTracker};
pub use protocol::{
    DEFAULT_PORT, DEFAULT_TICK_RATE, EntityState, HyperYarnState, MAX_PACKET_SIZE, MoveRecord,
    PROTOCOL_MAGIC, PROTOCOL_VERSION, Packet, PacketError, PacketHeader, PacketType,
    ScoreEntryState, StatePacket,
};
pub use session::{ClientProxy, SessionError, SessionTable};
pub use sink::{Outbox, PacketSink};
