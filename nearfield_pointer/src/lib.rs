// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearfield Pointer: throttled cursor sampling and capability probing.
//!
//! ## Sampling
//!
//! The host feeds raw pointer events into [`CursorTracker`] together with a
//! millisecond timestamp; there is no ambient clock. The tracker emits at most
//! one [`CursorSample`] per throttle window (~16.7 ms). Samples arriving
//! faster are dropped, not queued: last-sample-wins. A dropped move still
//! updates the raw position, so the next accepted sample (or an explicit
//! [`CursorTracker::flush`] at frame time) reflects the latest physical
//! position.
//!
//! Velocity is Δposition/Δt normalized to a 16.7 ms reference frame, so its
//! magnitude reads as "units per frame" independent of event cadence. The
//! cursor counts as moving above 0.5 units/frame.
//!
//! Click state toggles on button down/up and is never throttled.
//!
//! ```rust
//! use kurbo::Point;
//! use nearfield_pointer::CursorTracker;
//!
//! let mut tracker = CursorTracker::new();
//! let first = tracker.pointer_moved(Point::new(10.0, 10.0), 1000);
//! assert!(first.is_some());
//!
//! // 5 ms later: inside the throttle window, dropped.
//! assert!(tracker.pointer_moved(Point::new(12.0, 10.0), 1005).is_none());
//!
//! // 20 ms later: accepted, and it carries the latest position.
//! let next = tracker.pointer_moved(Point::new(40.0, 10.0), 1020).unwrap();
//! assert_eq!(next.position, Point::new(40.0, 10.0));
//! ```
//!
//! ## Capabilities
//!
//! [`Capabilities`] is a one-shot snapshot of what the host surface supports,
//! produced by a [`CapabilityProbe`] when the engine is constructed and passed
//! down immutably. Nothing re-queries the environment afterwards, which keeps
//! capability-dependent behavior deterministic under test.

#![no_std]

use bitflags::bitflags;
use kurbo::{Point, Vec2};

/// Reference frame used to normalize velocity, in milliseconds.
pub const FRAME_MS: f64 = 16.7;

/// Throttle window between emitted samples, in milliseconds.
pub const THROTTLE_MS: u64 = 16;

/// Velocity magnitude (units per frame) above which the cursor is moving.
pub const MOVING_THRESHOLD: f64 = 0.5;

bitflags! {
    /// What the host surface is capable of, probed once per engine instance.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// CSS filter primitives are available.
        const CSS_FILTERS = 1 << 0;
        /// SVG filter elements are available.
        const SVG_FILTERS = 1 << 1;
        /// Blend modes are available for layer compositing. Enables the
        /// additive glow hint on rendered frames.
        const MIX_BLEND_MODE = 1 << 2;
        /// The host can schedule per-frame callbacks. Advisory: the engine is
        /// host-driven either way, hosts without scheduling poll on a timer.
        const FRAME_SCHEDULING = 1 << 3;
        /// The user prefers reduced motion.
        const REDUCED_MOTION = 1 << 4;
        /// Touch input is present.
        const TOUCH = 1 << 5;
        /// A fine pointer (mouse/trackpad) is present.
        const FINE_POINTER = 1 << 6;
    }
}

impl Capabilities {
    /// Whether distortion-style effects can run at all.
    pub fn supports_distortion(self) -> bool {
        self.contains(Self::CSS_FILTERS)
    }

    /// Whether the surface is touch-only (no fine pointer detected yet).
    ///
    /// Touch-only surfaces gate the engine off until a pointer move reveals
    /// hybrid input.
    pub fn touch_only(self) -> bool {
        self.contains(Self::TOUCH) && !self.contains(Self::FINE_POINTER)
    }

    /// Whether continuous motion effects are acceptable to the user.
    pub fn motion_allowed(self) -> bool {
        !self.contains(Self::REDUCED_MOTION)
    }
}

/// One-shot prober for [`Capabilities`].
///
/// Hosts implement this against their real environment; tests hand the engine
/// a fixed snapshot.
pub trait CapabilityProbe {
    /// Probe the environment. Called exactly once per engine instance.
    fn probe(&self) -> Capabilities;
}

impl CapabilityProbe for Capabilities {
    fn probe(&self) -> Capabilities {
        *self
    }
}

/// One composite cursor update.
///
/// Emitted at most once per throttle window so downstream consumers recompute
/// from a single object per tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorSample {
    /// Pointer position.
    pub position: Point,
    /// Velocity in units per 16.7 ms reference frame.
    pub velocity: Vec2,
    /// Velocity magnitude, units per frame.
    pub speed: f64,
    /// Whether the cursor is considered moving.
    pub is_moving: bool,
    /// Whether a button is currently held.
    pub is_clicking: bool,
    /// Timestamp of the event that produced this sample.
    pub timestamp_ms: u64,
}

/// Pointer state sampler with last-wins throttling.
#[derive(Clone, Debug, Default)]
pub struct CursorTracker {
    // Latest raw (possibly unemitted) position.
    raw: Option<Point>,
    // Position/time of the last emitted sample.
    emitted: Option<(Point, u64)>,
    is_clicking: bool,
    // True when a raw move arrived since the last emitted sample.
    dirty: bool,
}

impl CursorTracker {
    /// Create a tracker with no position yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest raw pointer position, regardless of throttling.
    pub fn position(&self) -> Option<Point> {
        self.raw
    }

    /// Whether a button is currently held.
    pub fn is_clicking(&self) -> bool {
        self.is_clicking
    }

    /// Feed a pointer move. Returns a sample unless the throttle window
    /// swallows it.
    pub fn pointer_moved(&mut self, position: Point, now_ms: u64) -> Option<CursorSample> {
        self.raw = Some(position);
        self.dirty = true;
        match self.emitted {
            Some((_, last_ms)) if now_ms.saturating_sub(last_ms) < THROTTLE_MS => None,
            _ => Some(self.emit(position, now_ms)),
        }
    }

    /// Emit the latest dropped position once the throttle window has passed.
    ///
    /// Call once per frame so a burst of dropped moves still settles on the
    /// final physical position. Returns `None` when there is nothing pending
    /// or the window has not yet elapsed.
    pub fn flush(&mut self, now_ms: u64) -> Option<CursorSample> {
        if !self.dirty {
            return None;
        }
        let position = self.raw?;
        match self.emitted {
            Some((_, last_ms)) if now_ms.saturating_sub(last_ms) < THROTTLE_MS => None,
            _ => Some(self.emit(position, now_ms)),
        }
    }

    /// Record a button press. Click state is never throttled.
    pub fn button_down(&mut self) {
        self.is_clicking = true;
    }

    /// Record a button release.
    pub fn button_up(&mut self) {
        self.is_clicking = false;
    }

    /// Forget all pointer state, as on engine stop.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn emit(&mut self, position: Point, now_ms: u64) -> CursorSample {
        let velocity = match self.emitted {
            Some((prev, prev_ms)) => {
                let dt = now_ms.saturating_sub(prev_ms) as f64;
                if dt > 0.0 {
                    (position - prev) * (FRAME_MS / dt)
                } else {
                    Vec2::ZERO
                }
            }
            None => Vec2::ZERO,
        };
        self.emitted = Some((position, now_ms));
        self.dirty = false;
        let speed = velocity.hypot();
        CursorSample {
            position,
            velocity,
            speed,
            is_moving: speed > MOVING_THRESHOLD,
            is_clicking: self.is_clicking,
            timestamp_ms: now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_emits_with_zero_velocity() {
        let mut t = CursorTracker::new();
        let s = t.pointer_moved(Point::new(5.0, 5.0), 100).unwrap();
        assert_eq!(s.velocity, Vec2::ZERO);
        assert!(!s.is_moving);
        assert!(!s.is_clicking);
    }

    #[test]
    fn samples_inside_window_are_dropped_last_wins() {
        let mut t = CursorTracker::new();
        assert!(t.pointer_moved(Point::new(0.0, 0.0), 0).is_some());
        assert!(t.pointer_moved(Point::new(1.0, 0.0), 4).is_none());
        assert!(t.pointer_moved(Point::new(2.0, 0.0), 8).is_none());
        // Raw position tracks the dropped moves.
        assert_eq!(t.position(), Some(Point::new(2.0, 0.0)));

        let s = t.pointer_moved(Point::new(30.0, 0.0), 20).unwrap();
        assert_eq!(s.position, Point::new(30.0, 0.0));
    }

    #[test]
    fn flush_emits_pending_position_after_window() {
        let mut t = CursorTracker::new();
        t.pointer_moved(Point::new(0.0, 0.0), 0);
        t.pointer_moved(Point::new(9.0, 0.0), 5);

        // Still inside the window.
        assert!(t.flush(10).is_none());

        let s = t.flush(20).expect("pending position should flush");
        assert_eq!(s.position, Point::new(9.0, 0.0));

        // Nothing left afterwards.
        assert!(t.flush(40).is_none());
    }

    #[test]
    fn velocity_is_normalized_to_reference_frame() {
        let mut t = CursorTracker::new();
        t.pointer_moved(Point::new(0.0, 0.0), 0);
        // 33.4 ms later (= two reference frames), 20 units right.
        let s = t.pointer_moved(Point::new(20.0, 0.0), 33).unwrap();
        // ~10 units/frame.
        assert!((s.velocity.x - 20.0 * FRAME_MS / 33.0).abs() < 1e-9);
        assert!(s.is_moving);
    }

    #[test]
    fn slow_drift_is_not_moving() {
        let mut t = CursorTracker::new();
        t.pointer_moved(Point::new(0.0, 0.0), 0);
        let s = t.pointer_moved(Point::new(0.2, 0.0), 100).unwrap();
        assert!(s.speed < MOVING_THRESHOLD);
        assert!(!s.is_moving);
    }

    #[test]
    fn click_state_is_unthrottled_and_carried_on_samples() {
        let mut t = CursorTracker::new();
        t.pointer_moved(Point::new(0.0, 0.0), 0);
        t.button_down();
        assert!(t.is_clicking());
        let s = t.pointer_moved(Point::new(5.0, 0.0), 20).unwrap();
        assert!(s.is_clicking);
        t.button_up();
        assert!(!t.is_clicking());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut t = CursorTracker::new();
        t.pointer_moved(Point::new(1.0, 1.0), 0);
        t.button_down();
        t.reset();
        assert_eq!(t.position(), None);
        assert!(!t.is_clicking());
    }

    #[test]
    fn capability_helpers() {
        let caps = Capabilities::CSS_FILTERS | Capabilities::TOUCH;
        assert!(caps.supports_distortion());
        assert!(caps.touch_only());
        assert!(caps.motion_allowed());

        let hybrid = caps | Capabilities::FINE_POINTER;
        assert!(!hybrid.touch_only());

        let reduced = Capabilities::REDUCED_MOTION;
        assert!(!reduced.motion_allowed());
        assert!(!reduced.supports_distortion());
    }
}
