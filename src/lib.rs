//! Core library for the arbitrage-simulator project.
//!
//! Exchange adapters produce raw order books, the aggregator fetches them
//! concurrently, and the arbitrage module turns them into prepared ladders
//! for trade and route simulation.

pub mod aggregator;
pub mod arbitrage;
pub mod assets;
pub mod cex;
pub mod config;
pub mod errors;
pub mod models;
pub mod utils;
