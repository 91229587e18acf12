//! Dual-channel mixing core: automation, graph, host boundary, engine

pub mod automation;
pub mod channel;
pub mod engine;
pub mod graph;
pub mod host;

pub use automation::GainParam;
pub use channel::{ChannelId, MediaChannel};
pub use engine::{CrossfadeHandle, MixerEngine};
pub use graph::AudioGraph;
pub use host::{AudioHost, AudioOutput, MediaElement, OutputState, SimHost};
