//! Host audio facilities
//!
//! Decoding, device output, and the media transport itself are delegated to
//! the host platform. This module specifies that boundary as traits so the
//! engine owns no platform handles directly and tests can inject a simulated
//! host.
//!
//! - [`AudioHost`] opens the audio output and creates media elements.
//! - [`AudioOutput`] owns the audio clock and the final destination. It is a
//!   small state machine (`Suspended` / `Running` / `Closed`): hosts with
//!   activation policies (e.g. no user gesture yet) hand the output over
//!   suspended, and the engine resumes it before starting playback.
//! - [`MediaElement`] is a playable media handle: assign a stream URL, start,
//!   pause, rewind. Each element feeds exactly one graph input; elements are
//!   created once at graph construction and never re-attached.
//!
//! [`SimHost`] is the in-crate simulated implementation used by the test
//! suite and the CLI demo. Embedders provide their own implementation over
//! the platform media stack.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mixer::channel::ChannelId;

/// Lifecycle state of the host audio output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// Output exists but will not render audio until resumed
    Suspended,

    /// Output is rendering
    Running,

    /// Output has been closed; terminal
    Closed,
}

/// Host audio output: audio clock plus final destination
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Current lifecycle state
    fn state(&self) -> OutputState;

    /// Transition `Suspended` -> `Running`.
    ///
    /// No-op when already running. Fails with [`Error::Playback`] when the
    /// host rejects the resume (activation policy) and [`Error::Closed`]
    /// when the output has been closed.
    async fn resume(&self) -> Result<()>;

    /// Release the host audio resources. Idempotent.
    fn close(&self);

    /// Audio-clock time in seconds since the output was opened.
    ///
    /// Monotonic; independent of wall-clock jitter. All gain automation is
    /// scheduled against this clock.
    fn current_time(&self) -> f64;
}

/// Playable media handle provided by the host
///
/// The host performs all fetching and decoding; the engine only assigns
/// sources and drives the play/pause lifecycle.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Assign the stream URL to play. Replaces any previous source.
    fn set_source(&self, url: &str);

    /// Start (or restart) playback of the assigned source.
    ///
    /// Fails with [`Error::Playback`] when the host rejects the attempt
    /// (network failure, decode failure, activation policy); the element is
    /// left paused with its source intact.
    async fn play(&self) -> Result<()>;

    /// Pause playback. Best-effort, never fails.
    fn pause(&self);

    /// Reset the playback position to the start of the stream
    fn seek_start(&self);

    /// Currently assigned stream URL, if any
    fn source(&self) -> Option<String>;

    /// True when not actively playing (including when no source is assigned)
    fn is_paused(&self) -> bool;
}

/// Host audio subsystem entry point
#[async_trait]
pub trait AudioHost: Send + Sync {
    /// Open the audio output.
    ///
    /// Fails with [`Error::Initialization`] when the subsystem is
    /// unavailable; the caller may retry later.
    async fn open_output(&self) -> Result<Arc<dyn AudioOutput>>;

    /// Create a media element for the given channel
    fn create_element(&self, id: ChannelId) -> Arc<dyn MediaElement>;
}

// ========================================
// Simulated host
// ========================================

/// Shared fault configuration for the simulated host
#[derive(Debug, Default)]
struct SimFaults {
    /// URLs whose play attempts are rejected
    rejected_urls: Vec<String>,

    /// Reject the next output resume (activation policy simulation)
    reject_resume: bool,
}

/// Simulated host for tests and demos
///
/// Outputs start suspended, like a browser audio context before a user
/// gesture. Faults are injected per stream URL or on the output resume.
pub struct SimHost {
    available: bool,
    faults: Arc<Mutex<SimFaults>>,
    elements: Mutex<Vec<(ChannelId, Arc<SimElement>)>>,
    outputs: Mutex<Vec<Arc<SimOutput>>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self {
            available: true,
            faults: Arc::new(Mutex::new(SimFaults::default())),
            elements: Mutex::new(Vec::new()),
            outputs: Mutex::new(Vec::new()),
        }
    }

    /// Host whose `open_output` fails, for initialization-error paths
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Reject any play attempt for `url` from now on
    pub fn reject_url(&self, url: &str) {
        self.faults.lock().unwrap().rejected_urls.push(url.to_string());
    }

    /// Stop rejecting play attempts for `url`
    pub fn allow_url(&self, url: &str) {
        self.faults.lock().unwrap().rejected_urls.retain(|u| u != url);
    }

    /// Make the next output resume fail
    pub fn reject_resume(&self) {
        self.faults.lock().unwrap().reject_resume = true;
    }

    /// Number of media elements created so far (one per channel per graph)
    pub fn created_elements(&self) -> usize {
        self.elements.lock().unwrap().len()
    }

    /// State of the most recently opened output, if any
    pub fn output_state(&self) -> Option<OutputState> {
        self.outputs
            .lock()
            .unwrap()
            .last()
            .map(|o| *o.state.lock().unwrap())
    }

    /// The element created for `id`, once the graph has been built
    pub fn element(&self, id: ChannelId) -> Option<Arc<SimElement>> {
        self.elements
            .lock()
            .unwrap()
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| Arc::clone(e))
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioHost for SimHost {
    async fn open_output(&self) -> Result<Arc<dyn AudioOutput>> {
        if !self.available {
            return Err(Error::Initialization(
                "simulated audio subsystem unavailable".to_string(),
            ));
        }
        let output = Arc::new(SimOutput {
            epoch: Instant::now(),
            state: Mutex::new(OutputState::Suspended),
            faults: Arc::clone(&self.faults),
        });
        self.outputs.lock().unwrap().push(Arc::clone(&output));
        Ok(output)
    }

    fn create_element(&self, id: ChannelId) -> Arc<dyn MediaElement> {
        let element = Arc::new(SimElement {
            id,
            faults: Arc::clone(&self.faults),
            state: Mutex::new(SimElementState::default()),
        });
        self.elements.lock().unwrap().push((id, Arc::clone(&element)));
        element
    }
}

/// Simulated audio output
struct SimOutput {
    epoch: Instant,
    state: Mutex<OutputState>,
    faults: Arc<Mutex<SimFaults>>,
}

#[async_trait]
impl AudioOutput for SimOutput {
    fn state(&self) -> OutputState {
        *self.state.lock().unwrap()
    }

    async fn resume(&self) -> Result<()> {
        let state = self.state();
        match state {
            OutputState::Running => Ok(()),
            OutputState::Closed => Err(Error::Closed("audio output is closed".to_string())),
            OutputState::Suspended => {
                let rejected = {
                    let mut faults = self.faults.lock().unwrap();
                    std::mem::take(&mut faults.reject_resume)
                };
                if rejected {
                    return Err(Error::Playback(
                        "output resume rejected by host policy".to_string(),
                    ));
                }
                *self.state.lock().unwrap() = OutputState::Running;
                debug!("simulated output resumed");
                Ok(())
            }
        }
    }

    fn close(&self) {
        *self.state.lock().unwrap() = OutputState::Closed;
    }

    fn current_time(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

#[derive(Debug)]
struct SimElementState {
    source: Option<String>,
    paused: bool,
    position_secs: f64,
}

impl Default for SimElementState {
    fn default() -> Self {
        Self {
            source: None,
            paused: true,
            position_secs: 0.0,
        }
    }
}

/// Simulated media element with inspectable state
pub struct SimElement {
    id: ChannelId,
    faults: Arc<Mutex<SimFaults>>,
    state: Mutex<SimElementState>,
}

impl SimElement {
    /// Simulate playback progress, for exercising `seek_start`
    pub fn set_position_secs(&self, secs: f64) {
        self.state.lock().unwrap().position_secs = secs;
    }

    /// Current simulated playback position
    pub fn position_secs(&self) -> f64 {
        self.state.lock().unwrap().position_secs
    }
}

#[async_trait]
impl MediaElement for SimElement {
    fn set_source(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.source = Some(url.to_string());
        state.position_secs = 0.0;
    }

    async fn play(&self) -> Result<()> {
        let source = self.state.lock().unwrap().source.clone();
        let Some(url) = source else {
            return Err(Error::Playback(format!(
                "{} element has no source assigned",
                self.id
            )));
        };

        let rejected = self
            .faults
            .lock()
            .unwrap()
            .rejected_urls
            .iter()
            .any(|u| *u == url);
        if rejected {
            return Err(Error::Playback(format!(
                "{} element rejected stream {}",
                self.id, url
            )));
        }

        self.state.lock().unwrap().paused = false;
        debug!(channel = %self.id, url = %url, "simulated element playing");
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().unwrap().paused = true;
    }

    fn seek_start(&self) {
        self.state.lock().unwrap().position_secs = 0.0;
    }

    fn source(&self) -> Option<String> {
        self.state.lock().unwrap().source.clone()
    }

    fn is_paused(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.source.is_none() || state.paused
    }
}

// ========================================
// Tests
// ========================================
