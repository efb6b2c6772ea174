use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use robocat::net::MAX_PACKET_SIZE;
use robocat::{Packet, PacketHeader, PacketSink, PacketType};

#[derive(Debug, Clone, Default)]
pub struct EndpointStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

pub struct NetworkEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    stats: EndpointStats,
    recv_buffer: [u8; MAX_PACKET_SIZE],
    sequence: u32,
}

impl NetworkEndpoint {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;

        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            stats: EndpointStats::default(),
            recv_buffer: [0u8; MAX_PACKET_SIZE],
            sequence: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> &EndpointStats {
        &self.stats
    }

    pub fn send_to(&mut self, payload: PacketType, addr: SocketAddr) -> io::Result<usize> {
        let packet = Packet::new(PacketHeader::new(self.sequence), payload);
        self.sequence = self.sequence.wrapping_add(1);

        let data = packet
            .serialize()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        if data.len() > MAX_PACKET_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("packet of {} bytes exceeds MTU", data.len()),
            ));
        }

        let bytes = self.socket.send_to(&data, addr)?;

        self.stats.packets_sent += 1;
        self.stats.bytes_sent += bytes as u64;

        Ok(bytes)
    }

    pub fn receive(&mut self) -> io::Result<Vec<(Packet, SocketAddr)>> {
        let mut packets = Vec::new();

        loop {
            match self.socket.recv_from(&mut self.recv_buffer) {
                Ok((size, addr)) => match Packet::deserialize(&self.recv_buffer[..size]) {
                    Ok(packet) if packet.header.is_valid() => {
                        self.stats.packets_received += 1;
                        self.stats.bytes_received += size as u64;
                        packets.push((packet, addr));
                    }
                    Ok(_) => {
                        self.stats.packets_dropped += 1;
                        log::debug!("dropping packet with foreign header from {}", addr);
                    }
                    Err(e) => {
                        self.stats.packets_dropped += 1;
                        log::debug!("dropping malformed packet from {}: {}", addr, e);
                    }
                },
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                // Windows reports ICMP port unreachable from earlier sends here.
                Err(ref e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(packets)
    }
}

impl PacketSink for NetworkEndpoint {
    fn send_packet(&mut self, payload: PacketType, addr: SocketAddr) {
        if let Err(e) = self.send_to(payload, addr) {
            log::warn!("failed to send to {}: {}", addr, e);
        }
    }
}
