//! Single-turn chat relay in front of the Gemini API, served over HTTP and a terminal loop.

pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
