// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearfield Wave: expanding click rings and one-shot element collisions.
//!
//! A click spawns a [`Wave`] at the click position: a ring that grows by a
//! fixed step and fades by a fixed decay factor each frame, pruned once it
//! reaches its maximum radius or its opacity drops below [`OPACITY_EPSILON`].
//! Spawning beyond the configured wave budget evicts the oldest live wave.
//!
//! Collision is bounding-circle-vs-ring: an element is hit on the frame where
//! its center's distance from the wave origin falls inside
//! `[radius − element_radius, radius + element_radius]`. Because the ring can
//! overlap an element across several frames, a `(wave, element)` seen-set
//! guarantees at most one [`CollisionPulse`] per pair for the wave's entire
//! lifetime; the pair records die with their wave.
//!
//! Waves carry an arbitrary `Copy` payload (the engine stores the theme color
//! resolved at spawn time) that rides along on pulses and rendered rings.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::Point;

use nearfield_registry::ElementId;

/// Ring growth per frame, in surface units.
pub const RADIUS_STEP: f64 = 6.0;

/// Multiplicative opacity decay per frame.
pub const OPACITY_DECAY: f64 = 0.94;

/// Opacity below which a wave is pruned.
pub const OPACITY_EPSILON: f64 = 0.02;

/// Default number of simultaneously live waves.
pub const DEFAULT_MAX_WAVES: usize = 6;

/// Default maximum ring radius.
pub const DEFAULT_MAX_RADIUS: f64 = 320.0;

/// Identifier for a spawned wave, unique within its tracker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WaveId(u64);

/// One expanding, fading click ring.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Wave<C> {
    /// Tracker-unique id.
    pub id: WaveId,
    /// Click position the ring expands from.
    pub origin: Point,
    /// Current ring radius; grows monotonically.
    pub radius: f64,
    /// Radius at which the wave is pruned.
    pub max_radius: f64,
    /// Current opacity; decays monotonically.
    pub opacity: f64,
    /// Spawn timestamp.
    pub spawned_ms: u64,
    /// Caller payload captured at spawn (e.g. the theme color).
    pub payload: C,
}

/// A one-shot collision between a wave ring and an element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionPulse<C> {
    /// The wave whose ring crossed the element.
    pub wave: WaveId,
    /// The element that was hit.
    pub element: ElementId,
    /// Ring origin, for effects radiating from the click.
    pub origin: Point,
    /// Wave opacity at the moment of the hit.
    pub opacity: f64,
    /// The wave's payload.
    pub payload: C,
}

/// Spawns, advances, prunes, and collision-tests click waves.
#[derive(Clone, Debug)]
pub struct WaveTracker<C> {
    waves: Vec<Wave<C>>,
    seen: HashSet<(WaveId, ElementId)>,
    next_id: u64,
    max_waves: usize,
    max_radius: f64,
}

impl<C: Copy> WaveTracker<C> {
    /// Create a tracker with the given wave budget and maximum ring radius.
    pub fn new(max_waves: usize, max_radius: f64) -> Self {
        Self {
            waves: Vec::new(),
            seen: HashSet::new(),
            next_id: 0,
            max_waves: max_waves.max(1),
            max_radius: if max_radius > 0.0 {
                max_radius
            } else {
                DEFAULT_MAX_RADIUS
            },
        }
    }

    /// Live waves, oldest first.
    pub fn waves(&self) -> &[Wave<C>] {
        &self.waves
    }

    /// Spawn a wave at the click position.
    ///
    /// When the budget is exceeded the oldest live wave is dropped, together
    /// with its collision records.
    pub fn spawn(&mut self, origin: Point, payload: C, now_ms: u64) -> WaveId {
        let id = WaveId(self.next_id);
        self.next_id += 1;
        self.waves.push(Wave {
            id,
            origin,
            radius: 0.0,
            max_radius: self.max_radius,
            opacity: 1.0,
            spawned_ms: now_ms,
            payload,
        });
        while self.waves.len() > self.max_waves {
            let evicted = self.waves.remove(0);
            self.forget(evicted.id);
        }
        id
    }

    /// Advance every wave one frame and report fresh collisions.
    ///
    /// `elements` supplies each candidate's bounding-circle center and radius.
    /// Pairs already hit by a wave are not reported again.
    pub fn step(&mut self, elements: &[(ElementId, Point, f64)]) -> Vec<CollisionPulse<C>> {
        let mut pulses = Vec::new();

        for wave in &mut self.waves {
            wave.radius = (wave.radius + RADIUS_STEP).min(wave.max_radius);
            wave.opacity *= OPACITY_DECAY;

            for &(element, center, element_radius) in elements {
                let d = (center - wave.origin).hypot();
                if !d.is_finite() || element_radius <= 0.0 {
                    continue;
                }
                let hit = d >= wave.radius - element_radius && d <= wave.radius + element_radius;
                if hit && self.seen.insert((wave.id, element)) {
                    pulses.push(CollisionPulse {
                        wave: wave.id,
                        element,
                        origin: wave.origin,
                        opacity: wave.opacity,
                        payload: wave.payload,
                    });
                }
            }
        }

        // Prune exhausted waves and discard their pair records.
        let mut pruned: Vec<WaveId> = Vec::new();
        self.waves.retain(|w| {
            let dead = w.radius >= w.max_radius || w.opacity <= OPACITY_EPSILON;
            if dead {
                pruned.push(w.id);
            }
            !dead
        });
        for id in pruned {
            self.forget(id);
        }

        pulses
    }

    /// Drop all waves and collision records, as on engine stop.
    pub fn clear(&mut self) {
        self.waves.clear();
        self.seen.clear();
    }

    fn forget(&mut self, wave: WaveId) {
        self.seen.retain(|&(w, _)| w != wave);
    }
}

impl<C: Copy> Default for WaveTracker<C> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WAVES, DEFAULT_MAX_RADIUS)
    }
}
