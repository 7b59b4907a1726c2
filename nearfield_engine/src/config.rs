// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration and its defensive resolution.
//!
//! Resolution clamps every numeric field into its documented range with a
//! logged warning, so a misconfigured visual effect never takes the host
//! page down, and gates effect layers against the capability snapshot.

use nearfield_overlay::{EffectLayers, Theme, ThemePreset, ZoneStrategy};
use nearfield_pointer::Capabilities;
use nearfield_registry::{DEFAULT_PROXIMITY_RADIUS, clamp_unit, normalize_radius};
use nearfield_wave::{DEFAULT_MAX_RADIUS, DEFAULT_MAX_WAVES};

/// Theme selection: a named preset or a fully custom theme.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ThemeChoice {
    /// One of the built-in presets.
    Preset(ThemePreset),
    /// A caller-supplied theme.
    Custom(Theme),
}

impl Default for ThemeChoice {
    fn default() -> Self {
        Self::Preset(ThemePreset::default())
    }
}

/// Engine configuration as supplied by the host.
#[derive(Clone, Debug)]
pub struct Config {
    /// Theme selection.
    pub theme: ThemeChoice,
    /// Global effect intensity in `[0, 1]`.
    pub intensity: f64,
    /// Which overlay layers run.
    pub layers: EffectLayers,
    /// Whether touch-only surfaces disable the engine.
    pub disable_on_mobile: bool,
    /// Default proximity radius for elements that do not override it.
    pub proximity_radius: f64,
    /// Maximum simultaneously live click waves.
    pub max_waves: usize,
    /// Maximum click-wave ring radius.
    pub max_wave_radius: f64,
    /// How theme zones partition the viewport.
    pub zones: ZoneStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeChoice::default(),
            intensity: 1.0,
            layers: EffectLayers::all(),
            disable_on_mobile: true,
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            max_waves: DEFAULT_MAX_WAVES,
            max_wave_radius: DEFAULT_MAX_RADIUS,
            zones: ZoneStrategy::Vertical,
        }
    }
}

/// Configuration after clamping and capability gating.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedConfig {
    pub(crate) theme: Theme,
    pub(crate) intensity: f64,
    pub(crate) layers: EffectLayers,
    pub(crate) disable_on_mobile: bool,
    pub(crate) proximity_radius: f64,
    pub(crate) max_waves: usize,
    pub(crate) max_wave_radius: f64,
    pub(crate) zones: ZoneStrategy,
}

pub(crate) fn resolve(config: Config, caps: Capabilities) -> ResolvedConfig {
    let mut layers = config.layers;
    if layers.contains(EffectLayers::DISTORTION) && !caps.supports_distortion() {
        // Graceful degradation, not an error: the surface cannot do filters.
        layers.remove(EffectLayers::DISTORTION);
    }

    ResolvedConfig {
        theme: match config.theme {
            ThemeChoice::Preset(p) => p.theme(),
            ThemeChoice::Custom(t) => t,
        },
        intensity: clamp_unit(config.intensity, 1.0, "config.intensity"),
        layers,
        disable_on_mobile: config.disable_on_mobile,
        proximity_radius: normalize_radius(
            Some(config.proximity_radius),
            DEFAULT_PROXIMITY_RADIUS,
        ),
        max_waves: config.max_waves.max(1),
        max_wave_radius: if config.max_wave_radius.is_finite() && config.max_wave_radius > 0.0 {
            config.max_wave_radius
        } else {
            log::warn!(
                "nearfield: config.max_wave_radius {} invalid, using default {DEFAULT_MAX_RADIUS}",
                config.max_wave_radius
            );
            DEFAULT_MAX_RADIUS
        },
        zones: config.zones,
    }
}
