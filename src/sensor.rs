//! Motion Sensor Service Definitions

use embassy_time::{Duration, Timer};
use embedded_hal::digital::InputPin;

use crate::clock::MonotonicClock;
use crate::debug;
use crate::detector::{MotionDetector, MotionEvent};

#[derive(Debug, Clone, Copy)]
/// Struct representing the configuration for a motion sensor.
pub struct MotionConfig {
    delay: Duration,
    sample_interval: Duration,
}

impl MotionConfig {
    /// Creates a new MotionConfig instance with the given quiescence window
    /// and sampling interval.
    pub fn new(delay: Duration, sample_interval: Duration) -> Self {
        Self {
            delay,
            sample_interval,
        }
    }

    /// Gets the quiescence window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Gets the sampling interval.
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }
}

/// Default MotionConfig with a quiescence window of 30s and a sampling
/// interval of 50ms.
impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(30),
            sample_interval: Duration::from_millis(50),
        }
    }
}

/// Trait to be implemented by consumers of motion events.
///
/// Both hooks are fire-and-forget notifications with no feedback into the
/// state machine; each is invoked exactly once per episode.
pub trait MotionHandler {
    /// Invoked once when a motion episode begins.
    fn on_motion_start(&mut self);

    /// Invoked once when a motion episode ends, i.e. the quiescence window
    /// elapsed with no further detections.
    fn on_motion_end(&mut self);

    /// Routes an event to the matching hook.
    fn handle(&mut self, event: MotionEvent) {
        match event {
            MotionEvent::Started => self.on_motion_start(),
            MotionEvent::Ended => self.on_motion_end(),
        }
    }
}

#[derive(Debug)]
/// A struct representing a motion sensor with a generic GPIO pin and clock.
///
/// Wraps the [`MotionDetector`] state machine around the digital output of a
/// presence sensor. The pin and clock are injected at construction, so tests
/// can substitute mocks for both.
pub struct MotionSensor<P, C> {
    pin: P,
    clock: C,
    detector: MotionDetector,
    config: MotionConfig,
}

impl<P: InputPin, C: MonotonicClock> MotionSensor<P, C> {
    /// Creates a new `MotionSensor` instance with the given GPIO pin and clock.
    pub fn new(pin: P, clock: C, config: MotionConfig) -> Self {
        Self {
            pin,
            clock,
            detector: MotionDetector::new(config.delay()),
            config,
        }
    }

    /// Returns the sensor configuration.
    pub fn get_config(&self) -> &MotionConfig {
        &self.config
    }

    /// Sets the sensor configuration. Takes effect on the next poll.
    pub fn set_config(&mut self, config: MotionConfig) {
        self.detector.set_delay(config.delay());
        self.config = config;
    }

    /// Sets the quiescence window. Takes effect on the next poll.
    pub fn set_delay(&mut self, delay: Duration) {
        self.config.delay = delay;
        self.detector.set_delay(delay);
    }

    /// Returns `true` while inside an active motion episode.
    pub fn is_triggered(&self) -> bool {
        self.detector.is_triggered()
    }

    /// Samples the sensor level once and advances the state machine.
    ///
    /// A pin read failure is treated as "no motion"; this layer has no error
    /// channel and a stuck input is an integration concern.
    pub fn poll(&mut self) -> Option<MotionEvent> {
        let has_motion = self.pin.is_high().unwrap_or(false);
        let event = self.detector.update(has_motion, self.clock.now_ms());

        match event {
            Some(MotionEvent::Started) => debug!("motion started"),
            Some(MotionEvent::Ended) => debug!("motion ended"),
            None => (),
        }

        event
    }

    /// Polls the sensor at the configured sampling interval, dispatching
    /// events to the handler. Never returns.
    pub async fn run<H: MotionHandler>(&mut self, handler: &mut H) {
        loop {
            if let Some(event) = self.poll() {
                handler.handle(event);
            }
            Timer::after(self.config.sample_interval()).await;
        }
    }

    /// Consumes the sensor, releasing the pin and clock.
    pub fn release(self) -> (P, C) {
        (self.pin, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    use super::*;

    #[derive(Clone, Copy)]
    struct FakeClock<'a>(&'a Cell<u32>);

    impl FakeClock<'_> {
        fn advance(&self, ms: u32) {
            self.0.set(self.0.get().wrapping_add(ms));
        }
    }

    impl MonotonicClock for FakeClock<'_> {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        starts: u32,
        ends: u32,
    }

    impl MotionHandler for CountingHandler {
        fn on_motion_start(&mut self) {
            self.starts += 1;
        }

        fn on_motion_end(&mut self) {
            self.ends += 1;
        }
    }

    fn config(delay_ms: u64) -> MotionConfig {
        MotionConfig::new(Duration::from_millis(delay_ms), Duration::from_millis(50))
    }

    #[test]
    fn poll_debounces_an_episode() {
        let expectations = [
            PinTransaction::get(State::High),
            PinTransaction::get(State::High),
            PinTransaction::get(State::Low),
            PinTransaction::get(State::Low),
        ];
        let time = Cell::new(0);
        let clock = FakeClock(&time);
        let mut sensor = MotionSensor::new(PinMock::new(&expectations), clock, config(1000));

        assert_eq!(sensor.poll(), Some(MotionEvent::Started));
        clock.advance(500);
        assert_eq!(sensor.poll(), None);
        clock.advance(500);
        assert_eq!(sensor.poll(), None);
        clock.advance(500);
        assert_eq!(sensor.poll(), Some(MotionEvent::Ended));

        let (mut pin, _) = sensor.release();
        pin.done();
    }

    #[test]
    fn quiet_input_produces_no_events() {
        let expectations = [PinTransaction::get(State::Low), PinTransaction::get(State::Low)];
        let time = Cell::new(0);
        let clock = FakeClock(&time);
        let mut sensor = MotionSensor::new(PinMock::new(&expectations), clock, config(1000));

        assert_eq!(sensor.poll(), None);
        clock.advance(50);
        assert_eq!(sensor.poll(), None);
        assert!(!sensor.is_triggered());

        let (mut pin, _) = sensor.release();
        pin.done();
    }

    #[test]
    fn set_delay_applies_to_the_running_episode() {
        let expectations = [
            PinTransaction::get(State::High),
            PinTransaction::get(State::Low),
            PinTransaction::get(State::Low),
        ];
        let time = Cell::new(0);
        let clock = FakeClock(&time);
        let mut sensor = MotionSensor::new(PinMock::new(&expectations), clock, config(60_000));

        assert_eq!(sensor.poll(), Some(MotionEvent::Started));
        clock.advance(500);
        assert_eq!(sensor.poll(), None);

        sensor.set_delay(Duration::from_millis(400));
        assert_eq!(sensor.poll(), Some(MotionEvent::Ended));

        let (mut pin, _) = sensor.release();
        pin.done();
    }

    #[test]
    fn handler_receives_each_hook_once_per_episode() {
        let expectations = [
            PinTransaction::get(State::High),
            PinTransaction::get(State::High),
            PinTransaction::get(State::Low),
        ];
        let time = Cell::new(0);
        let clock = FakeClock(&time);
        let mut sensor = MotionSensor::new(PinMock::new(&expectations), clock, config(100));
        let mut handler = CountingHandler::default();

        for _ in 0..2 {
            if let Some(event) = sensor.poll() {
                handler.handle(event);
            }
            clock.advance(200);
        }
        if let Some(event) = sensor.poll() {
            handler.handle(event);
        }

        assert_eq!(handler.starts, 1);
        assert_eq!(handler.ends, 1);

        let (mut pin, _) = sensor.release();
        pin.done();
    }
}
