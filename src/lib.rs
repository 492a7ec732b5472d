//! Motion Sensor Service
//!
//! Debounces the digital output of a doppler-radar presence sensor (such as
//! the RCWL-0516) into two edge-triggered events: motion started and motion
//! ended. Motion ended is only reported once a configurable quiescence window
//! has elapsed with no further detections, counted from the *last* positive
//! reading rather than the first.
//!
//! The state machine in [`detector`] is hardware-free and polled with plain
//! values, which keeps it deterministic under test. [`sensor`] binds it to an
//! `embedded-hal` input pin and a [`clock::MonotonicClock`] for real use.

#![no_std]
#![warn(missing_docs)]

pub mod clock;
pub mod detector;
pub mod fmt;
pub mod sensor;
