//! Breakpoint gain automation.
//!
//! An [`Envelope`] is a strictly increasing list of `(time, gain)` points read
//! as linear ramps: the gain is held at the first value before the first
//! point and at the last value after the last point.
//!
//! The background envelope is built once for the whole track and then scoped
//! to each chunk, so chunk boundaries never change the curve.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{SynthesisError, SynthesisResult};
use crate::timeline::BellSchedule;

/// A gain control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainBreakpoint {
    /// Time in seconds.
    pub time_seconds: f64,
    /// Target gain, 0.0 to 1.0.
    pub gain: f64,
}

impl GainBreakpoint {
    /// Creates a breakpoint.
    pub fn new(time_seconds: f64, gain: f64) -> Self {
        Self { time_seconds, gain }
    }
}

/// Piecewise-linear gain curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    points: Vec<GainBreakpoint>,
}

impl Envelope {
    /// Builds an envelope, rejecting points that are not strictly increasing in time.
    ///
    /// `name` identifies the envelope in the error.
    pub fn new(name: &str, points: Vec<GainBreakpoint>) -> SynthesisResult<Self> {
        let mut previous = f64::NEG_INFINITY;
        for (index, point) in points.iter().enumerate() {
            if !point.time_seconds.is_finite() || point.time_seconds <= previous {
                return Err(SynthesisError::EnvelopeOrderingViolation {
                    envelope: name.to_string(),
                    index,
                    previous,
                    time: point.time_seconds,
                });
            }
            previous = point.time_seconds;
        }
        Ok(Self { points })
    }

    /// A flat envelope at `gain`.
    pub fn constant(gain: f64) -> Self {
        Self {
            points: vec![GainBreakpoint::new(0.0, gain)],
        }
    }

    /// The control points.
    pub fn points(&self) -> &[GainBreakpoint] {
        &self.points
    }

    /// Gain at `time_seconds`.
    pub fn value_at(&self, time_seconds: f64) -> f64 {
        let Some(first) = self.points.first() else {
            return 1.0;
        };
        if time_seconds <= first.time_seconds {
            return first.gain;
        }

        // First point strictly after `time_seconds`.
        let next = self
            .points
            .partition_point(|p| p.time_seconds <= time_seconds);
        if next >= self.points.len() {
            return self.points[self.points.len() - 1].gain;
        }

        let a = self.points[next - 1];
        let b = self.points[next];
        let t = (time_seconds - a.time_seconds) / (b.time_seconds - a.time_seconds);
        a.gain + (b.gain - a.gain) * t
    }

    /// Restricts the envelope to `[start, end]` and shifts it to start at zero.
    ///
    /// The result has a point at 0 holding the value at `start`, every interior
    /// point, and a point at `end - start` holding the value at `end`, so it
    /// evaluates to the same curve over the window.
    pub fn scoped(&self, start_seconds: f64, end_seconds: f64) -> Envelope {
        let mut points = vec![GainBreakpoint::new(0.0, self.value_at(start_seconds))];
        points.extend(
            self.points
                .iter()
                .filter(|p| p.time_seconds > start_seconds && p.time_seconds < end_seconds)
                .map(|p| GainBreakpoint::new(p.time_seconds - start_seconds, p.gain)),
        );

        let span = end_seconds - start_seconds;
        let last = points[points.len() - 1].time_seconds;
        if span > last {
            points.push(GainBreakpoint::new(span, self.value_at(end_seconds)));
        }

        Envelope { points }
    }
}

/// Builds the background and bell envelopes from the engine config.
#[derive(Debug, Clone)]
pub struct EnvelopeScheduler<'a> {
    config: &'a EngineConfig,
}

impl<'a> EnvelopeScheduler<'a> {
    /// Creates a scheduler.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Track-wide background curve: fade in, duck under every bell, fade out.
    pub fn background_envelope(
        &self,
        schedule: &BellSchedule,
        total_seconds: f64,
    ) -> SynthesisResult<Envelope> {
        let bg = &self.config.background;
        let mut points = Vec::with_capacity(4 + schedule.len() * 4);

        if bg.fade_in_seconds > 0.0 {
            points.push(GainBreakpoint::new(0.0, 0.0));
            points.push(GainBreakpoint::new(bg.fade_in_seconds, 1.0));
        } else {
            points.push(GainBreakpoint::new(0.0, 1.0));
        }

        for &t in schedule.times() {
            let silent_until = t + bg.duck_hold_seconds;
            points.push(GainBreakpoint::new(t - bg.duck_lead_seconds, 1.0));
            points.push(GainBreakpoint::new(t, 0.0));
            points.push(GainBreakpoint::new(silent_until, 0.0));
            points.push(GainBreakpoint::new(
                silent_until + bg.duck_release_seconds,
                1.0,
            ));
        }

        // A full-level point already at the fade-out start is reused.
        let fade_out_start = total_seconds - bg.fade_out_seconds;
        let at_full_level = points
            .last()
            .is_some_and(|p| p.time_seconds == fade_out_start && p.gain == 1.0);
        if !at_full_level {
            points.push(GainBreakpoint::new(fade_out_start, 1.0));
        }
        if bg.fade_out_seconds > 0.0 {
            points.push(GainBreakpoint::new(total_seconds, 0.0));
        }

        Envelope::new("background", points)
    }

    /// Per-strike curve relative to the bell start.
    ///
    /// Fades in over `bell.fade_seconds`, holds, and fades out so that it
    /// reaches zero at `bell_duration_seconds`.
    pub fn bell_envelope(&self, bell_duration_seconds: f64) -> SynthesisResult<Envelope> {
        let fade = self.config.bell.fade_seconds;
        let fade_out_start = bell_duration_seconds - fade;

        let mut points = vec![
            GainBreakpoint::new(0.0, 0.0),
            GainBreakpoint::new(fade, 1.0),
        ];
        if fade_out_start != fade {
            points.push(GainBreakpoint::new(fade_out_start, 1.0));
        }
        points.push(GainBreakpoint::new(bell_duration_seconds, 0.0));

        Envelope::new("bell", points)
    }
}
