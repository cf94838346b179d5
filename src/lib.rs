//! Simulated cryptocurrency price streaming over a dual-protocol channel.
//!
//! The server side (`server`, `simulator`, `store`) bootstraps clients over
//! HTTP and pushes continuous updates over WebSocket from one shared price
//! book. The client side (`feed`) is the interesting part: a
//! connection-resilience state machine that validates every inbound message,
//! keeps a bounded series, and recovers from disconnects with bounded
//! backoff plus external recovery triggers.

pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod server;
pub mod simulator;
pub mod store;
pub mod utils;
