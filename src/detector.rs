//! Debounced Edge Detector Definitions

use embassy_time::Duration;

use crate::warn;

/// Upper bound for the quiescence window.
///
/// The wraparound correction in [`MotionDetector::time_since_trigger`] is only
/// valid while at most one counter wrap occurs between the last positive
/// reading and the poll that observes it. Seven days sits well below the
/// ~49.7 day period of a 32-bit millisecond counter.
pub const MAX_DELAY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Enum representing the edge-triggered events emitted by the detector.
pub enum MotionEvent {
    /// A motion episode began. Emitted once, on the first positive reading.
    Started,
    /// A motion episode ended. Emitted once, after the quiescence window
    /// elapsed with no further positive readings.
    Ended,
}

#[derive(Debug)]
/// Struct representing the debounced edge-detector state machine.
///
/// Two states, Idle and Triggered. A positive reading moves Idle to Triggered
/// and emits [`MotionEvent::Started`]; every positive reading while Triggered
/// refreshes the trigger timestamp, so the quiescence window counts from the
/// last detection rather than the first. Once a negative reading is observed
/// with the window fully elapsed, the machine returns to Idle and emits
/// [`MotionEvent::Ended`].
///
/// The machine is fed plain values and holds no hardware handles; see
/// [`MotionSensor`](crate::sensor::MotionSensor) for the pin-backed wrapper.
pub struct MotionDetector {
    delay_ms: u32,
    triggered: bool,
    last_trigger_ms: u32,
}

impl MotionDetector {
    /// Creates a new detector in the Idle state with the given quiescence window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay_ms: clamp_delay(delay),
            triggered: false,
            last_trigger_ms: 0,
        }
    }

    /// Sets the quiescence window. Takes effect on the next evaluation.
    ///
    /// A zero delay means an episode ends on the first negative reading.
    /// Values above [`MAX_DELAY`] are clamped.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay_ms = clamp_delay(delay);
    }

    /// Gets the quiescence window.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms as u64)
    }

    /// Returns `true` while inside an active motion episode.
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Advances the state machine by one poll step.
    ///
    /// `has_motion` is the current sensor level and `now_ms` the current value
    /// of the wrapping millisecond counter. Safe to call at arbitrarily high
    /// frequency; when no transition is warranted this is a no-op.
    pub fn update(&mut self, has_motion: bool, now_ms: u32) -> Option<MotionEvent> {
        // A negative reading while triggered only evaluates the quiescence
        // window; a call acts on exactly one branch.
        if self.triggered && !has_motion {
            return self.check_quiescence(now_ms);
        }

        if has_motion {
            let started = !self.triggered;
            self.triggered = true;
            // Refresh on every positive reading, not just the first, so the
            // episode ends delay_ms after the last detection.
            self.last_trigger_ms = now_ms;
            if started {
                return Some(MotionEvent::Started);
            }
        }

        None
    }

    /// Ends the episode if the quiescence window has elapsed.
    fn check_quiescence(&mut self, now_ms: u32) -> Option<MotionEvent> {
        if self.time_since_trigger(now_ms) >= self.delay_ms {
            self.triggered = false;
            self.last_trigger_ms = 0;
            return Some(MotionEvent::Ended);
        }

        None
    }

    /// Milliseconds since the last positive reading, zero when Idle.
    ///
    /// Corrects for a single wrap of the counter between the last trigger and
    /// `now_ms`; [`MAX_DELAY`] keeps usage within that bound.
    fn time_since_trigger(&self, now_ms: u32) -> u32 {
        if !self.triggered {
            return 0;
        }

        if now_ms < self.last_trigger_ms {
            // Counter wrapped between the trigger and now.
            now_ms + (u32::MAX - self.last_trigger_ms)
        } else {
            now_ms - self.last_trigger_ms
        }
    }
}

fn clamp_delay(delay: Duration) -> u32 {
    if delay > MAX_DELAY {
        warn!("quiescence delay clamped to {} ms", MAX_DELAY.as_millis());
        MAX_DELAY.as_millis() as u32
    } else {
        delay.as_millis() as u32
    }
}
