//! Scheduled gain automation
//!
//! A [`GainParam`] is a scalar gain stage whose value is described by a
//! timeline of scheduled events against the audio clock: immediate sets and
//! linear ramps. Evaluation is declarative (no busy-wait): the instantaneous
//! value at any clock time is computed from the timeline on demand.
//!
//! # Scheduling semantics
//!
//! Scheduling a new event truncates everything at or after its anchor time,
//! so when two operations schedule overlapping automation the last-scheduled
//! instruction wins. History before the anchor is preserved: an in-flight
//! ramp spanning the anchor is shortened, not removed, so past evaluations
//! stay accurate.
//!
//! # Setpoint vs. instantaneous value
//!
//! The *setpoint* is the last explicitly requested volume and is what the
//! volume getters report. Ramps move the instantaneous value without touching
//! the setpoint, so a crossfade can capture the volume to restore even when a
//! previous fade is mid-flight.

use std::sync::{Arc, Mutex};

/// One scheduled automation event on the gain timeline
#[derive(Debug, Clone, Copy, PartialEq)]
enum AutomationEvent {
    /// Step to `value` at clock time `at`, holding until the next event
    Set { value: f32, at: f64 },

    /// Linear ramp from `from_value` at `from` to `to_value` at `to`
    Ramp {
        from_value: f32,
        from: f64,
        to_value: f32,
        to: f64,
    },
}

impl AutomationEvent {
    fn start(&self) -> f64 {
        match self {
            AutomationEvent::Set { at, .. } => *at,
            AutomationEvent::Ramp { from, .. } => *from,
        }
    }

    /// Value the event yields at time `t` within or after its window
    fn value_at(&self, t: f64) -> f32 {
        match *self {
            AutomationEvent::Set { value, .. } => value,
            AutomationEvent::Ramp {
                from_value,
                from,
                to_value,
                to,
            } => {
                if t >= to {
                    to_value
                } else if to <= from {
                    // Degenerate window: treat as a step
                    to_value
                } else {
                    let progress = ((t - from) / (to - from)).clamp(0.0, 1.0);
                    from_value + (to_value - from_value) * progress as f32
                }
            }
        }
    }
}

/// Timeline state behind the shared handle
#[derive(Debug)]
struct Timeline {
    /// Value before the first scheduled event
    initial: f32,

    /// Last explicitly requested volume (not moved by ramps)
    setpoint: f32,

    /// Events sorted by start time, non-overlapping
    events: Vec<AutomationEvent>,
}

impl Timeline {
    fn value_at(&self, t: f64) -> f32 {
        // Last event starting at or before t governs the value
        let mut value = self.initial;
        for event in &self.events {
            if event.start() <= t {
                value = event.value_at(t);
            } else {
                break;
            }
        }
        value
    }

    /// Drop events starting at or after `t`; shorten an in-flight ramp so the
    /// timeline still evaluates correctly for times before `t`.
    fn truncate_at(&mut self, t: f64) {
        self.events.retain(|e| e.start() < t);

        if let Some(last) = self.events.last_mut() {
            if let AutomationEvent::Ramp {
                from_value,
                from,
                to,
                ..
            } = *last
            {
                if to > t {
                    let cut_value = last.value_at(t);
                    *last = AutomationEvent::Ramp {
                        from_value,
                        from,
                        to_value: cut_value,
                        to: t,
                    };
                }
            }
        }
    }
}

/// Shared handle to a scalar gain stage with scheduled automation
///
/// Cheap to clone; all clones observe the same timeline. Gain values are
/// clamped to `[0, +inf)`.
#[derive(Debug, Clone)]
pub struct GainParam {
    inner: Arc<Mutex<Timeline>>,
}

impl GainParam {
    /// Create a gain stage with the given initial value (also the setpoint)
    pub fn new(initial: f32) -> Self {
        let initial = initial.max(0.0);
        Self {
            inner: Arc::new(Mutex::new(Timeline {
                initial,
                setpoint: initial,
                events: Vec::new(),
            })),
        }
    }

    /// Last explicitly requested volume
    pub fn setpoint(&self) -> f32 {
        self.inner.lock().unwrap().setpoint
    }

    /// Instantaneous value at audio-clock time `t`
    pub fn value_at(&self, t: f64) -> f32 {
        self.inner.lock().unwrap().value_at(t)
    }

    /// Step to `value` at clock time `at`, overriding anything scheduled at
    /// or after `at`. Moves the setpoint.
    pub fn set_value_at(&self, value: f32, at: f64) {
        let value = value.max(0.0);
        let mut timeline = self.inner.lock().unwrap();
        timeline.truncate_at(at);
        timeline.events.push(AutomationEvent::Set { value, at });
        timeline.setpoint = value;
    }

    /// Schedule a linear ramp to `value`, ending at clock time `end`.
    ///
    /// The ramp is anchored at the parameter's instantaneous value at `now`,
    /// matching the gain's audible level even when an earlier ramp is still
    /// in flight. Does not move the setpoint.
    pub fn linear_ramp_to(&self, value: f32, end: f64, now: f64) {
        let value = value.max(0.0);
        let mut timeline = self.inner.lock().unwrap();
        let from_value = timeline.value_at(now);
        timeline.truncate_at(now);
        timeline.events.push(AutomationEvent::Ramp {
            from_value,
            from: now,
            to_value: value,
            to: end.max(now),
        });
    }
}

// ========================================
// Tests
// ========================================
