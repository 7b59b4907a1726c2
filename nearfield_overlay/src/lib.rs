// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearfield Overlay: presentation layers as plain frame data.
//!
//! The overlay is split into four independently toggleable layers (glow,
//! distortion, wave rings, and particle bursts), each rendered by a pure
//! function from engine state into inert data. Nothing here touches a host
//! surface: the composed [`OverlayFrame`] describes what to paint; the host
//! paints it into its fixed, input-transparent layer above the page content.
//!
//! [`zone`] maps the cursor position to one of the active theme's three
//! colors by viewport band, giving a positional color gradient without any
//! per-pixel work.
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use nearfield_overlay::theme::ThemePreset;
//! use nearfield_overlay::zone::{self, ZoneStrategy};
//!
//! let theme = ThemePreset::Neon.theme();
//! let viewport = Size::new(1200.0, 800.0);
//!
//! // Top band → primary, bottom band → tertiary.
//! let top = zone::resolve(&theme, ZoneStrategy::Vertical, Point::new(0.0, 100.0), viewport);
//! let bottom = zone::resolve(&theme, ZoneStrategy::Vertical, Point::new(0.0, 700.0), viewport);
//! assert_eq!(top, theme.primary);
//! assert_eq!(bottom, theme.tertiary);
//! ```

pub mod layers;
pub mod theme;
pub mod zone;

pub use layers::{
    DistortionLayer, EffectLayers, GlowLayer, OverlayFrame, OverlayRenderer, Particle, WaveRing,
};
pub use theme::{Color, Theme, ThemePreset};
pub use zone::ZoneStrategy;
