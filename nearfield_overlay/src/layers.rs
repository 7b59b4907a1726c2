// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The four overlay layers, rendered as inert frame data.
//!
//! Layers hold no state beyond what arrives in their inputs; disabling a
//! layer yields `None`/empty for that layer and leaves the others untouched.

use core::f64::consts::TAU;

use bitflags::bitflags;
use kurbo::{Point, Vec2};

use nearfield_pointer::{Capabilities, CursorSample};
use nearfield_wave::{CollisionPulse, Wave};

use crate::theme::{Color, Theme};

bitflags! {
    /// Which overlay layers are enabled.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct EffectLayers: u8 {
        /// The cursor glow halo.
        const GLOW = 1 << 0;
        /// The lens-distortion layer under the cursor.
        const DISTORTION = 1 << 1;
        /// Click-wave rings.
        const WAVES = 1 << 2;
        /// Collision particle bursts.
        const PARTICLES = 1 << 3;
    }
}

/// Particles emitted per collision pulse.
pub const PARTICLES_PER_BURST: usize = 8;

/// The cursor glow halo.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlowLayer {
    /// Halo center.
    pub position: Point,
    /// Halo radius in surface units.
    pub radius: f64,
    /// Halo opacity in `[0, 1]`.
    pub opacity: f64,
    /// Zone-resolved color.
    pub color: Color,
    /// Compositing hint: paint the halo additively when the surface supports
    /// blend modes, alpha-blend otherwise.
    pub additive: bool,
}

/// The distortion layer under the cursor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistortionLayer {
    /// Distortion center.
    pub position: Point,
    /// Filter strength in `[0, 1]`.
    pub strength: f64,
}

/// One rendered wave ring.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WaveRing {
    /// Ring center.
    pub origin: Point,
    /// Current ring radius.
    pub radius: f64,
    /// Current ring opacity.
    pub opacity: f64,
    /// Color captured at spawn time.
    pub color: Color,
}

/// One particle of a collision burst.
///
/// A burst is a description, not an animation: the host integrates
/// `origin + direction × speed × t` over its own clock.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    /// Burst origin (the wave origin).
    pub origin: Point,
    /// Unit direction of travel.
    pub direction: Vec2,
    /// Travel speed in surface units per frame.
    pub speed: f64,
    /// Particle size.
    pub size: f64,
    /// Particle color.
    pub color: Color,
}

/// One composed overlay frame, ready for the host to paint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayFrame {
    /// Glow halo, when the layer is enabled.
    pub glow: Option<GlowLayer>,
    /// Distortion, when enabled and the surface supports filters.
    pub distortion: Option<DistortionLayer>,
    /// Live wave rings.
    pub waves: Vec<WaveRing>,
    /// Fresh collision bursts for this frame.
    pub particles: Vec<Particle>,
}

/// Renders enabled layers from engine state into an [`OverlayFrame`].
#[derive(Copy, Clone, Debug)]
pub struct OverlayRenderer {
    layers: EffectLayers,
    intensity: f64,
}

impl OverlayRenderer {
    /// Create a renderer with the given enabled layers and global intensity
    /// (already clamped by the engine's config resolution).
    pub fn new(layers: EffectLayers, intensity: f64) -> Self {
        Self { layers, intensity }
    }

    /// The enabled layer set.
    pub fn layers(&self) -> EffectLayers {
        self.layers
    }

    /// Compose one frame.
    ///
    /// `caps` is the capability snapshot: without filter support the
    /// distortion layer stays dark no matter what the config asks for, and
    /// blend-mode support decides the glow's compositing hint.
    pub fn render(
        &self,
        sample: &CursorSample,
        theme: &Theme,
        zone_color: Color,
        waves: &[Wave<Color>],
        pulses: &[CollisionPulse<Color>],
        caps: Capabilities,
    ) -> OverlayFrame {
        OverlayFrame {
            glow: self
                .layers
                .contains(EffectLayers::GLOW)
                .then(|| self.glow(sample, theme, zone_color, caps)),
            distortion: (self.layers.contains(EffectLayers::DISTORTION)
                && caps.supports_distortion())
                .then(|| self.distortion(sample, theme))
                .flatten(),
            waves: if self.layers.contains(EffectLayers::WAVES) {
                waves.iter().map(ring).collect()
            } else {
                Vec::new()
            },
            particles: if self.layers.contains(EffectLayers::PARTICLES) {
                pulses.iter().flat_map(burst).collect()
            } else {
                Vec::new()
            },
        }
    }

    fn glow(
        &self,
        sample: &CursorSample,
        theme: &Theme,
        zone_color: Color,
        caps: Capabilities,
    ) -> GlowLayer {
        // Fast cursor movement stretches the halo up to 1.5×.
        let speed_ease = 1.0 + (sample.speed / 20.0).min(1.0) * 0.5;
        GlowLayer {
            position: sample.position,
            radius: theme.glow_size * self.intensity * speed_ease,
            opacity: (theme.glow_opacity * self.intensity).clamp(0.0, 1.0),
            color: zone_color,
            additive: caps.contains(Capabilities::MIX_BLEND_MODE),
        }
    }

    fn distortion(&self, sample: &CursorSample, theme: &Theme) -> Option<DistortionLayer> {
        let strength = (theme.distortion_intensity * self.intensity).clamp(0.0, 1.0);
        (strength > 0.0).then_some(DistortionLayer {
            position: sample.position,
            strength,
        })
    }
}

fn ring(wave: &Wave<Color>) -> WaveRing {
    WaveRing {
        origin: wave.origin,
        radius: wave.radius,
        opacity: wave.opacity,
        color: wave.payload,
    }
}

/// A deterministic radial burst for one collision pulse.
fn burst(pulse: &CollisionPulse<Color>) -> impl Iterator<Item = Particle> {
    let origin = pulse.origin;
    let color = pulse.payload.with_alpha(pulse.opacity);
    (0..PARTICLES_PER_BURST).map(move |i| {
        let angle = TAU * (i as f64) / (PARTICLES_PER_BURST as f64);
        Particle {
            origin,
            direction: Vec2::new(angle.cos(), angle.sin()),
            speed: 2.5 + 0.5 * ((i % 3) as f64),
            size: 3.0,
            color,
        }
    })
}
