//! # atcmix engine
//!
//! Dual-channel real-time audio mixing controller: an "ATC" live-stream
//! channel and a music channel, mixed through per-channel and master gain
//! stages, with click-free source switching via timed crossfades.
//!
//! **Architecture:** a single [`mixer::MixerEngine`] owns the processing
//! graph (two media channels feeding a master bus on the host audio output)
//! and schedules gain automation against the output's monotonic audio clock.
//! Decoding and device output live behind the [`mixer::AudioHost`] trait
//! boundary. The [`catalog`] module is the thin data-fetching collaborator
//! that resolves stations and sources to stream URLs.

pub mod catalog;
pub mod config;
pub mod error;
pub mod mixer;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use mixer::{ChannelId, CrossfadeHandle, MixerEngine};
