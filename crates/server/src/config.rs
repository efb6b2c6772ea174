use robocat::{CatConfig, DEFAULT_TICK_RATE};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tick_rate: u32,
    pub max_clients: usize,
    pub client_timeout_secs: u64,
    pub ai_cats: usize,
    pub cat: CatConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_clients: 16,
            client_timeout_secs: 3,
            ai_cats: 0,
            cat: CatConfig::default(),
        }
    }
}
