//! Brain client - streaming chat client for a second-brain service
//!
//! The core is the incremental chat stream decoder in [`sse`] and
//! [`session`]; [`client`] wraps the backend's HTTP API around it.

pub mod adapters;
pub mod answer;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
