// src/crtsh/mod.rs
pub mod client;
pub mod collector;
pub mod types;

pub use client::CrtShClient;
pub use collector::Collector;
pub use types::CrtShEntry;
