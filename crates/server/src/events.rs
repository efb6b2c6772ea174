use std::net::SocketAddr;

use robocat::{NetworkId, PlayerId};

#[derive(Debug, Clone)]
pub enum ServerEvent {
    PlayerJoined {
        player_id: PlayerId,
        name: String,
        addr: SocketAddr,
        network_id: NetworkId,
    },
    PlayerLeft {
        player_id: PlayerId,
        reason: DisconnectReason,
    },
    JoinDenied {
        addr: SocketAddr,
        reason: String,
    },
    CatRespawned {
        player_id: PlayerId,
        network_id: NetworkId,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Graceful,
    Timeout,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::Graceful => "disconnected",
            DisconnectReason::Timeout => "timed out",
        }
    }
}

impl ServerEvent {
    pub fn log(&self) {
        match self {
            ServerEvent::PlayerJoined {
                player_id,
                name,
                addr,
                network_id,
            } => log::info!(
                "player {} ({}) joined from {} as cat {}",
                player_id,
                name,
                addr,
                network_id
            ),
            ServerEvent::PlayerLeft { player_id, reason } => {
                log::info!("player {} {}", player_id, reason.as_str())
            }
            ServerEvent::JoinDenied { addr, reason } => {
                log::warn!("join from {} denied: {}", addr, reason)
            }
            ServerEvent::CatRespawned {
                player_id,
                network_id,
            } => log::debug!("player {} respawned as cat {}", player_id, network_id),
            ServerEvent::Error { message } => log::error!("{}", message),
        }
    }
}
