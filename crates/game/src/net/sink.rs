use std::collections::VecDeque;
use std::net::SocketAddr;

use super::protocol::{Packet, PacketHeader, PacketType};

pub trait PacketSink {
    fn send_packet(&mut self, payload: PacketType, addr: SocketAddr);
}

#[derive(Debug, Default)]
pub struct Outbox {
    queued: VecDeque<(SocketAddr, Packet)>,
    sequence: u32,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (SocketAddr, Packet)> + '_ {
        self.queued.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

impl PacketSink for Outbox {
    fn send_packet(&mut self, payload: PacketType, addr: SocketAddr) {
        let header = PacketHeader::new(self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        self.queued.push_back((addr, Packet::new(header, payload)));
    }
}
