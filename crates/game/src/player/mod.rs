mod config;
mod controller;

pub use config::CatConfig;
pub use controller::CatController;
