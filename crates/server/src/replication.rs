use std::collections::VecDeque;

use robocat::net::{MAX_PACKET_SIZE, ScoreEntryState};
use robocat::{
    DirtyBatch, DirtyState, EntityState, HyperYarnState, Packet, PacketHeader, PacketType,
    ScoreBoard, StatePacket, World,
};

#[derive(Clone)]
enum Record {
    Entity(EntityState),
    Destroyed(u32),
    HyperYarn(HyperYarnState),
    Score(ScoreEntryState),
}

impl Record {
    fn push_into(self, packet: &mut StatePacket) {
        match self {
            Record::Entity(state) => packet.entities.push(state),
            Record::Destroyed(id) => packet.destroyed.push(id),
            Record::HyperYarn(state) => packet.hyper_yarns.push(state),
            Record::Score(entry) => packet.scores.push(entry),
        }
    }
}

pub fn collect_state(batch: &DirtyBatch, world: &World, scores: &ScoreBoard) -> Vec<StatePacket> {
    let mut records = Vec::new();

    for &(network_id, flags) in &batch.changed {
        // Entities created and destroyed within one tick have nothing to send.
        if let Some(entity) = world.get_by_network_id(network_id) {
            let mut state = entity.to_network_state();
            state.dirty = flags.bits();
            records.push(Record::Entity(state));
        }
    }
    records.extend(batch.destroyed.iter().copied().map(Record::Destroyed));

    let mut traces = Vec::new();
    for yarn in world.hyper_yarns() {
        yarn.write(&mut traces, DirtyState::all());
    }
    records.extend(traces.into_iter().map(Record::HyperYarn));
    records.extend(scores.to_network_state().into_iter().map(Record::Score));

    pack(records)
}

// Greedy fill against per-record sizes measured once. Each finished packet is
// serialized one more time to confirm it fits; padding can make the estimate
// short, in which case the tail record is moved on to the next packet.
fn pack(records: Vec<Record>) -> Vec<StatePacket> {
    let base = encoded_len(&StatePacket::default());
    let mut pending: VecDeque<(Record, usize)> = records
        .into_iter()
        .map(|record| {
            let mut alone = StatePacket::default();
            record.clone().push_into(&mut alone);
            let cost = encoded_len(&alone).saturating_sub(base);
            (record, cost)
        })
        .collect();

    let mut packets = Vec::new();
    while !pending.is_empty() {
        let mut batch = Vec::new();
        let mut estimate = base;
        while let Some((_, cost)) = pending.front() {
            let next = estimate.saturating_add(*cost);
            if !batch.is_empty() && next > MAX_PACKET_SIZE {
                break;
            }
            estimate = next;
            batch.extend(pending.pop_front());
        }

        loop {
            let packet = build(&batch);
            if fits(&packet) {
                packets.push(packet);
                break;
            }
            if batch.len() == 1 {
                log::warn!("state record too large for a single packet, dropped");
                break;
            }
            if let Some(last) = batch.pop() {
                pending.push_front(last);
            }
        }
    }

    if packets.is_empty() {
        packets.push(StatePacket::default());
    }
    packets
}

fn build(batch: &[(Record, usize)]) -> StatePacket {
    let mut packet = StatePacket::default();
    for (record, _) in batch {
        record.clone().push_into(&mut packet);
    }
    packet
}

fn encoded_len(state: &StatePacket) -> usize {
    let packet = Packet::new(PacketHeader::new(0), PacketType::State(state.clone()));
    packet.serialize().map_or(usize::MAX, |data| data.len())
}

fn fits(state: &StatePacket) -> bool {
    encoded_len(state) <= MAX_PACKET_SIZE
}
