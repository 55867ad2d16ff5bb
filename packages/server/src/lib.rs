// Naloxone Finder - API Core
//
// This crate provides the backend API for the provider/event search:
// two thin endpoints around one upstream AI completion call, plus the
// SSE relay used by the streaming search variant.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
