pub mod config;
mod http_layers;
mod resources;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use resources::INTERNAL_ERROR_MESSAGE;
pub use server::{make_app, run_server};
