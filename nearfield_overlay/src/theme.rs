// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme colors and named presets.

/// An RGBA color with components in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    /// Red component.
    pub r: f64,
    /// Green component.
    pub g: f64,
    /// Blue component.
    pub b: f64,
    /// Alpha component.
    pub a: f64,
}

impl Color {
    /// An opaque color from RGB components.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// This color with its alpha multiplied by `alpha`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: self.a * alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// A full effect theme.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Theme {
    /// Zone color for the first viewport band.
    pub primary: Color,
    /// Zone color for the middle band.
    pub secondary: Color,
    /// Zone color for the last band.
    pub tertiary: Color,
    /// Base glow radius in surface units.
    pub glow_size: f64,
    /// Glow opacity at full intensity.
    pub glow_opacity: f64,
    /// Distortion strength at full intensity.
    pub distortion_intensity: f64,
}

/// Built-in theme presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ThemePreset {
    /// Cool blues and violets on dark surfaces.
    #[default]
    Neon,
    /// Warm ambers shading into red.
    Ember,
    /// Desaturated grays for restrained interfaces.
    Mono,
    /// Greens and teals.
    Aurora,
}

impl ThemePreset {
    /// The concrete theme for this preset.
    pub fn theme(self) -> Theme {
        match self {
            Self::Neon => Theme {
                primary: Color::rgb(0.35, 0.55, 1.0),
                secondary: Color::rgb(0.65, 0.35, 1.0),
                tertiary: Color::rgb(1.0, 0.35, 0.75),
                glow_size: 120.0,
                glow_opacity: 0.55,
                distortion_intensity: 0.6,
            },
            Self::Ember => Theme {
                primary: Color::rgb(1.0, 0.65, 0.25),
                secondary: Color::rgb(1.0, 0.45, 0.2),
                tertiary: Color::rgb(0.9, 0.2, 0.15),
                glow_size: 100.0,
                glow_opacity: 0.5,
                distortion_intensity: 0.5,
            },
            Self::Mono => Theme {
                primary: Color::rgb(0.85, 0.85, 0.85),
                secondary: Color::rgb(0.6, 0.6, 0.6),
                tertiary: Color::rgb(0.4, 0.4, 0.4),
                glow_size: 80.0,
                glow_opacity: 0.35,
                distortion_intensity: 0.25,
            },
            Self::Aurora => Theme {
                primary: Color::rgb(0.25, 0.9, 0.6),
                secondary: Color::rgb(0.2, 0.7, 0.8),
                tertiary: Color::rgb(0.5, 0.95, 0.4),
                glow_size: 130.0,
                glow_opacity: 0.5,
                distortion_intensity: 0.55,
            },
        }
    }
}
