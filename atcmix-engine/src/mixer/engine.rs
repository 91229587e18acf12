//! Mixer engine orchestration
//!
//! Coordinates graph lifecycle, per-channel playback control, gain
//! automation, and crossfade switching. One engine instance lives for the
//! duration of a listening session; after [`MixerEngine::destroy`] it is
//! unusable and a fresh instance must be created.
//!
//! All entry points are non-blocking async operations on a shared handle.
//! Overlapping calls against the same channel are not serialized against
//! each other; callers that need strict ordering await each operation before
//! issuing the next.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, DEFAULT_ATC_GAIN, DEFAULT_MUSIC_GAIN};
use crate::error::{Error, Result};
use crate::mixer::channel::ChannelId;
use crate::mixer::graph::AudioGraph;
use crate::mixer::host::{AudioHost, OutputState};

/// Handle to a crossfade in flight
///
/// A switch operation schedules its fade-out synchronously and detaches the
/// stream swap and fade-in onto a timer task. The handle makes that detached
/// phase observable: await [`finished`](CrossfadeHandle::finished) for full
/// completion (including a mid-fade play failure, which would otherwise be
/// lost), or [`abort`](CrossfadeHandle::abort) to cancel whatever has not
/// yet run. Dropping the handle leaves the crossfade running.
pub struct CrossfadeHandle {
    task: Option<JoinHandle<Result<()>>>,
}

impl CrossfadeHandle {
    /// Handle for a switch that had nothing to do (engine never initialized)
    fn noop() -> Self {
        Self { task: None }
    }

    /// True when the switch was a no-op
    pub fn is_noop(&self) -> bool {
        self.task.is_none()
    }

    /// Cancel the detached phase. Automation already scheduled stays
    /// scheduled; the stream swap and fade-in stop wherever they are.
    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Wait for the full crossfade (fade-out, swap, fade-in) to complete.
    ///
    /// Returns the mid-fade play result: `Err(Error::Playback)` when the new
    /// stream was rejected, even though the fade-in was still scheduled.
    pub async fn finished(self) -> Result<()> {
        match self.task {
            None => Ok(()),
            Some(task) => match task.await {
                Ok(result) => result,
                Err(err) if err.is_cancelled() => {
                    Err(Error::Playback("crossfade aborted".to_string()))
                }
                Err(err) => Err(Error::Playback(format!("crossfade task failed: {err}"))),
            },
        }
    }
}

/// Dual-channel mixing controller
///
/// Owns the processing graph (two media channels, per-channel gain stages,
/// master bus) exclusively; no external code mutates the graph directly.
/// Graph construction is lazy: the first play call initializes it.
pub struct MixerEngine {
    host: Arc<dyn AudioHost>,
    config: EngineConfig,
    graph: RwLock<Option<AudioGraph>>,
    destroyed: AtomicBool,
}

impl MixerEngine {
    /// Create an idle engine over the given host with default gains
    pub fn new(host: Arc<dyn AudioHost>) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    pub fn with_config(host: Arc<dyn AudioHost>, config: EngineConfig) -> Self {
        Self {
            host,
            config,
            graph: RwLock::new(None),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Construct the processing graph. Idempotent: a no-op once initialized.
    ///
    /// Fails with [`Error::Initialization`] when the host audio subsystem is
    /// unavailable; the engine stays uninitialized and a later call may
    /// retry.
    pub async fn init(&self) -> Result<()> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(Error::Initialization(
                "engine has been destroyed; create a fresh instance".to_string(),
            ));
        }

        let mut graph = self.graph.write().await;
        if graph.is_some() {
            debug!("init: graph already constructed");
            return Ok(());
        }

        *graph = Some(AudioGraph::build(&self.host, &self.config).await?);
        Ok(())
    }

    /// True once the processing graph exists
    pub async fn is_initialized(&self) -> bool {
        self.graph.read().await.is_some()
    }

    /// Start the ATC channel on `url`. See [`MixerEngine::play`].
    pub async fn play_atc(&self, url: &str) -> Result<()> {
        self.play(ChannelId::Atc, url).await
    }

    /// Start the music channel on `url`. See [`MixerEngine::play`].
    pub async fn play_music(&self, url: &str) -> Result<()> {
        self.play(ChannelId::Music, url).await
    }

    /// Assign a resolved stream URL to a channel and start playback.
    ///
    /// Initializes the graph on first use and resumes a suspended output
    /// before playing. The URL is opaque; resolution belongs to the catalog
    /// layer. Playing a different URL on an already-playing channel is a
    /// hard replace; crossfading is [`MixerEngine::switch`].
    ///
    /// On [`Error::Playback`] the channel is left unplayed; the caller may
    /// retry with the same or a different URL.
    pub async fn play(&self, id: ChannelId, url: &str) -> Result<()> {
        self.init().await?;

        let graph = self.graph.read().await;
        // init() just succeeded, so the graph exists unless destroy() raced
        // us; treat that as a closed output.
        let graph = graph
            .as_ref()
            .ok_or_else(|| Error::Closed("engine destroyed during play".to_string()))?;

        graph.channel(id).start(graph.output(), url).await
    }

    /// Pause whichever channels are currently playing. Channels with no
    /// active source are untouched. Best-effort; never fails.
    pub async fn pause(&self) {
        let graph = self.graph.read().await;
        if let Some(graph) = graph.as_ref() {
            for channel in graph.channels() {
                channel.pause_if_playing();
            }
            info!("playback paused");
        }
    }

    /// Resume the output if suspended, then resume every channel that is
    /// paused and has a previously assigned stream URL. Channels never
    /// started are not auto-started.
    ///
    /// Per-channel resume attempts run concurrently. One rejection fails the
    /// whole operation with [`Error::Playback`], but channels that already
    /// resumed are not rolled back; partial success is a legitimate
    /// post-condition the caller must tolerate.
    pub async fn resume(&self) -> Result<()> {
        let graph = self.graph.read().await;
        let Some(graph) = graph.as_ref() else {
            return Ok(());
        };

        if graph.output().state() == OutputState::Suspended {
            graph.output().resume().await?;
        }

        let attempts: Vec<_> = graph
            .channels()
            .into_iter()
            .filter(|c| c.is_resumable())
            .map(|c| c.element().play())
            .collect();

        let mut first_error = None;
        for result in futures::future::join_all(attempts).await {
            if let Err(err) = result {
                warn!(error = %err, "channel resume rejected");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!("playback resumed");
                Ok(())
            }
        }
    }

    /// True iff both channels are either sourceless or individually paused.
    /// No side effects.
    pub async fn is_paused(&self) -> bool {
        let graph = self.graph.read().await;
        match graph.as_ref() {
            None => true,
            Some(graph) => graph
                .channels()
                .into_iter()
                .all(|c| c.is_effectively_paused()),
        }
    }

    /// Pause the ATC channel and rewind it to the stream start. Never fails.
    pub async fn stop_atc(&self) {
        self.stop(ChannelId::Atc).await;
    }

    /// Pause the music channel and rewind it to the stream start. Never fails.
    pub async fn stop_music(&self) {
        self.stop(ChannelId::Music).await;
    }

    async fn stop(&self, id: ChannelId) {
        let graph = self.graph.read().await;
        if let Some(graph) = graph.as_ref() {
            graph.channel(id).stop();
        }
    }

    /// Set the ATC channel gain at the current audio-clock instant (no ramp)
    pub async fn set_atc_volume(&self, value: f32) {
        self.set_channel_volume(ChannelId::Atc, value).await;
    }

    /// Set the music channel gain at the current audio-clock instant (no ramp)
    pub async fn set_music_volume(&self, value: f32) {
        self.set_channel_volume(ChannelId::Music, value).await;
    }

    async fn set_channel_volume(&self, id: ChannelId, value: f32) {
        let graph = self.graph.read().await;
        if let Some(graph) = graph.as_ref() {
            graph.channel(id).gain().set_value_at(value, graph.now());
            debug!(channel = %id, value, "channel volume set");
        }
    }

    /// Set the master bus gain at the current audio-clock instant (no ramp)
    pub async fn set_master_volume(&self, value: f32) {
        let graph = self.graph.read().await;
        if let Some(graph) = graph.as_ref() {
            graph.master().set_value_at(value, graph.now());
            debug!(value, "master volume set");
        }
    }

    /// Last-set ATC gain, or [`DEFAULT_ATC_GAIN`] before the graph exists so
    /// the UI can read a sane value pre-init
    pub async fn get_atc_volume(&self) -> f32 {
        let graph = self.graph.read().await;
        graph
            .as_ref()
            .map(|g| g.channel(ChannelId::Atc).gain().setpoint())
            .unwrap_or(DEFAULT_ATC_GAIN)
    }

    /// Last-set music gain, or [`DEFAULT_MUSIC_GAIN`] before the graph exists
    pub async fn get_music_volume(&self) -> f32 {
        let graph = self.graph.read().await;
        graph
            .as_ref()
            .map(|g| g.channel(ChannelId::Music).gain().setpoint())
            .unwrap_or(DEFAULT_MUSIC_GAIN)
    }

    /// Instantaneous (post-automation) gain of a channel, for metering.
    /// `None` before the graph exists.
    pub async fn channel_level(&self, id: ChannelId) -> Option<f32> {
        let graph = self.graph.read().await;
        graph
            .as_ref()
            .map(|g| g.channel(id).gain().value_at(g.now()))
    }

    /// Instantaneous (post-automation) gain of the master bus, for metering.
    /// `None` before the graph exists.
    pub async fn master_level(&self) -> Option<f32> {
        let graph = self.graph.read().await;
        graph.as_ref().map(|g| g.master().value_at(g.now()))
    }

    /// Current audio-clock time, `None` before the graph exists
    pub async fn clock_now(&self) -> Option<f64> {
        let graph = self.graph.read().await;
        graph.as_ref().map(|g| g.now())
    }

    /// Crossfade the ATC channel to a new station stream.
    /// See [`MixerEngine::switch`].
    pub async fn switch_atc_station(&self, url: &str, fade: Option<f64>) -> CrossfadeHandle {
        self.switch(ChannelId::Atc, url, fade).await
    }

    /// Crossfade the music channel to a new source stream.
    /// See [`MixerEngine::switch`].
    pub async fn switch_music_source(&self, url: &str, fade: Option<f64>) -> CrossfadeHandle {
        self.switch(ChannelId::Music, url, fade).await
    }

    /// Click-free source switch: ramp the channel gain to zero over the
    /// first half of `fade`, swap the stream, ramp back to the captured
    /// setpoint over the second half.
    ///
    /// The restore target is the gain *setpoint*, not the instantaneous
    /// value, so a switch issued mid-fade still converges on the volume the
    /// user asked for. A silent no-op when the engine was never initialized.
    ///
    /// If the mid-fade play is rejected the fade-in is still scheduled (the
    /// timeline converges to the setpoint either way); the failure surfaces
    /// through the returned [`CrossfadeHandle`]. Overlapping switches on the
    /// same channel are not serialized: the last-scheduled automation wins.
    pub async fn switch(&self, id: ChannelId, url: &str, fade: Option<f64>) -> CrossfadeHandle {
        let graph = self.graph.read().await;
        let Some(graph) = graph.as_ref() else {
            debug!(channel = %id, "switch ignored: engine not initialized");
            return CrossfadeHandle::noop();
        };

        let fade = fade.unwrap_or(self.config.fade_seconds).max(0.0);
        let half = fade / 2.0;

        let channel = graph.channel(id).clone();
        let output = Arc::clone(graph.output());

        // Fade out immediately, anchored on the audio clock.
        let target = channel.gain().setpoint();
        let now = output.current_time();
        channel.gain().linear_ramp_to(0.0, now + half, now);
        info!(channel = %id, url = %url, fade, "crossfade switch started");

        let url = url.to_string();
        let task = tokio::spawn(async move {
            // The swap waits on a wall-clock timer, independent of the audio
            // clock the ramps are scheduled against.
            tokio::time::sleep(Duration::from_secs_f64(half)).await;

            let played = channel.start(&output, &url).await;
            if let Err(err) = &played {
                warn!(channel = %channel.id(), error = %err, "mid-fade play failed");
            }

            let resume_at = output.current_time();
            channel.gain().linear_ramp_to(target, resume_at + half, resume_at);

            // Hold the handle open until the fade-in lands.
            tokio::time::sleep(Duration::from_secs_f64(half)).await;
            played
        });

        CrossfadeHandle { task: Some(task) }
    }

    /// Stop both channels, close the host output, and drop the graph.
    ///
    /// Safe to call multiple times and safe before any `init()`. After
    /// destroy the engine is unusable; `init()` will refuse to rebuild.
    pub async fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);

        let mut graph = self.graph.write().await;
        if let Some(graph) = graph.take() {
            for channel in graph.channels() {
                channel.stop();
            }
            graph.output().close();
            info!("mixer engine destroyed");
        }
    }
}

// ========================================
// Tests
// ========================================
