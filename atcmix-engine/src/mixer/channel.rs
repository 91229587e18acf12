//! Media channels
//!
//! A channel is one independent audio path: a host media element feeding a
//! per-channel gain stage. The engine owns exactly two ([`ChannelId::Atc`]
//! and [`ChannelId::Music`]).

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::mixer::automation::GainParam;
use crate::mixer::host::{AudioOutput, MediaElement, OutputState};

/// Identity of a mixer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    /// Live ATC stream channel
    Atc,

    /// Music stream channel
    Music,
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Atc => write!(f, "ATC"),
            ChannelId::Music => write!(f, "music"),
        }
    }
}

/// One audio path: media element plus per-channel gain stage
///
/// Cheap to clone; clones share the same element and gain timeline, so a
/// detached crossfade task can keep operating a channel while the engine
/// serves other calls.
#[derive(Clone)]
pub struct MediaChannel {
    id: ChannelId,
    element: Arc<dyn MediaElement>,
    gain: GainParam,
}

impl MediaChannel {
    pub fn new(id: ChannelId, element: Arc<dyn MediaElement>, gain: GainParam) -> Self {
        Self { id, element, gain }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn gain(&self) -> &GainParam {
        &self.gain
    }

    pub fn element(&self) -> &Arc<dyn MediaElement> {
        &self.element
    }

    /// Assign `url` and start playback, resuming the output first when the
    /// host is holding it suspended.
    ///
    /// A different URL on an already-playing channel is a hard replace;
    /// crossfading is a distinct engine operation.
    pub async fn start(&self, output: &Arc<dyn AudioOutput>, url: &str) -> Result<()> {
        if output.state() == OutputState::Suspended {
            output.resume().await?;
        }

        self.element.set_source(url);
        self.element.play().await?;
        info!(channel = %self.id, url = %url, "channel playing");
        Ok(())
    }

    /// Pause the channel if it is actively playing. Best-effort.
    pub fn pause_if_playing(&self) {
        if !self.element.is_paused() {
            self.element.pause();
            debug!(channel = %self.id, "channel paused");
        }
    }

    /// Pause and rewind to the start of the stream. The assigned URL is kept.
    pub fn stop(&self) {
        self.element.pause();
        self.element.seek_start();
        debug!(channel = %self.id, "channel stopped");
    }

    /// True when the channel has a source and is currently paused
    pub fn is_resumable(&self) -> bool {
        self.element.source().is_some() && self.element.is_paused()
    }

    /// True when the channel has no source or is paused.
    ///
    /// A channel that was never assigned a URL counts as paused regardless of
    /// any element-internal flags.
    pub fn is_effectively_paused(&self) -> bool {
        self.element.source().is_none() || self.element.is_paused()
    }
}
