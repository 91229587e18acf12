//! Audio processing graph
//!
//! Constructed once (lazily, on first use) and owned by the engine for the
//! lifetime of a listening session:
//!
//! ```text
//! ATC element   -> ATC gain   --+
//!                               +--> master gain -> output destination
//! music element -> music gain --+
//! ```
//!
//! Each media element feeds exactly one graph input and is attached exactly
//! once, at construction. Default gains are applied here so the graph comes
//! up audible at the documented levels.

use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::mixer::automation::GainParam;
use crate::mixer::channel::{ChannelId, MediaChannel};
use crate::mixer::host::{AudioHost, AudioOutput};

/// The wired processing graph: output, two channels, master bus
pub struct AudioGraph {
    output: Arc<dyn AudioOutput>,
    atc: MediaChannel,
    music: MediaChannel,
    master: GainParam,
}

impl AudioGraph {
    /// Open the host output and wire both channels through the master bus.
    ///
    /// Fails with [`crate::Error::Initialization`] when the host audio
    /// subsystem is unavailable; nothing is retained on failure, so the
    /// caller may retry.
    pub async fn build(host: &Arc<dyn AudioHost>, config: &EngineConfig) -> Result<Self> {
        let output = host.open_output().await?;

        let atc = MediaChannel::new(
            ChannelId::Atc,
            host.create_element(ChannelId::Atc),
            GainParam::new(config.atc_gain),
        );
        let music = MediaChannel::new(
            ChannelId::Music,
            host.create_element(ChannelId::Music),
            GainParam::new(config.music_gain),
        );
        let master = GainParam::new(config.master_gain);

        info!(
            atc_gain = config.atc_gain,
            music_gain = config.music_gain,
            master_gain = config.master_gain,
            "audio graph initialized"
        );

        Ok(Self {
            output,
            atc,
            music,
            master,
        })
    }

    pub fn output(&self) -> &Arc<dyn AudioOutput> {
        &self.output
    }

    pub fn channel(&self, id: ChannelId) -> &MediaChannel {
        match id {
            ChannelId::Atc => &self.atc,
            ChannelId::Music => &self.music,
        }
    }

    pub fn channels(&self) -> [&MediaChannel; 2] {
        [&self.atc, &self.music]
    }

    pub fn master(&self) -> &GainParam {
        &self.master
    }

    /// Audio-clock time of the owning output
    pub fn now(&self) -> f64 {
        self.output.current_time()
    }
}
