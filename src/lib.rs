// src/lib.rs
// Library interface for ct-harvest
pub mod cli;
pub mod config;
pub mod crtsh;
pub mod domain;
pub mod liveness;
pub mod output;
pub mod progress;
pub mod sampler;
pub mod stats;
pub mod store;
pub mod types;
