//! audio-intake library crate
//!
//! Normalizes heterogeneous audio sources (media containers and raw
//! RTP/UDP packet streams) into mono s16le 16kHz PCM chunks, delivered
//! through an async queue. The main binary is in main.rs.

#[macro_use]
extern crate log;

pub mod config;
pub mod constants;
pub mod error;
pub mod queue;
pub mod resample;
pub mod rtp;
pub mod sources;
pub mod stream;

// Test modules
#[cfg(test)]
mod queue_tests;
