use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::simulation::{InputState, Move};

pub const MAX_PACKET_SIZE: usize = 1200;
pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_MAGIC: u32 = 0x5943_4154;
pub const DEFAULT_PORT: u16 = 45000;
pub const DEFAULT_TICK_RATE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
    pub sequence: u32,
}

impl PacketHeader {
    pub fn new(sequence: u32) -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
            sequence,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum PacketType {
    Hello { name: String },
    Welcome { player_id: u32 },
    Input { moves: Vec<MoveRecord> },
    State(StatePacket),
    HyperYarnResult { hit: bool },
    Disconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct MoveRecord {
    pub input: InputState,
    pub timestamp: f32,
}

impl From<&Move> for MoveRecord {
    fn from(mv: &Move) -> Self {
        Self {
            input: *mv.input_state(),
            timestamp: mv.timestamp(),
        }
    }
}

impl From<MoveRecord> for Move {
    fn from(record: MoveRecord) -> Self {
        Move::new(record.input, record.timestamp, 0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct EntityState {
    pub network_id: u32,
    pub entity_type: u8,
    pub player_id: u32,
    pub location: [f32; 3],
    pub velocity: [f32; 3],
    pub rotation: f32,
    pub color: [f32; 3],
    pub health: i32,
    pub dirty: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct HyperYarnState {
    pub id: u32,
    pub rotation: [f32; 4],
    pub origin: [f32; 3],
    pub hit_point: [f32; 3],
    pub color: [f32; 3],
    pub cooldown: f32,
    pub active: bool,
    pub evaluated: bool,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct ScoreEntryState {
    pub player_id: u32,
    pub name: String,
    pub color: [f32; 3],
    pub score: i32,
}

#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct StatePacket {
    /// Newest move the server has simulated for the receiving client.
    pub last_move_timestamp: f32,
    pub entities: Vec<EntityState>,
    pub destroyed: Vec<u32>,
    pub hyper_yarns: Vec<HyperYarnState>,
    pub scores: Vec<ScoreEntryState>,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: PacketType,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
}

impl Packet {
    pub fn new(header: PacketHeader, payload: PacketType) -> Self {
        Self { header, payload }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        // Datagram buffers carry no alignment guarantee.
        let mut aligned = AlignedVec::<16>::with_capacity(data.len());
        aligned.extend_from_slice(data);
        rkyv::from_bytes::<Self, rancor::Error>(&aligned).map_err(PacketError::Deserialize)
    }
}
