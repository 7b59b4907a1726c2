// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme zones: position → theme color by viewport band.
//!
//! The viewport is partitioned into three bands (below 33%, 33–66%, above
//! 66%) along the strategy's axis. The cursor's band selects the theme's
//! primary, secondary, or tertiary color, a cheap positional gradient with
//! no per-pixel computation.

use kurbo::{Point, Size};

use crate::theme::{Color, Theme};

/// How the viewport is partitioned into color bands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ZoneStrategy {
    /// Bands along the Y axis.
    #[default]
    Vertical,
    /// Bands along the X axis.
    Horizontal,
    /// Bands by normalized distance from the viewport center.
    Radial,
    /// No zoning; always the primary color.
    None,
}

/// Resolve the theme color for a position.
///
/// Degenerate viewports (zero or negative extent on the relevant axis)
/// resolve to the primary color.
pub fn resolve(theme: &Theme, strategy: ZoneStrategy, position: Point, viewport: Size) -> Color {
    let t = match strategy {
        ZoneStrategy::None => return theme.primary,
        ZoneStrategy::Vertical => {
            if viewport.height <= 0.0 {
                return theme.primary;
            }
            position.y / viewport.height
        }
        ZoneStrategy::Horizontal => {
            if viewport.width <= 0.0 {
                return theme.primary;
            }
            position.x / viewport.width
        }
        ZoneStrategy::Radial => {
            if viewport.width <= 0.0 || viewport.height <= 0.0 {
                return theme.primary;
            }
            let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
            let max = (center.to_vec2()).hypot();
            (position - center).hypot() / max
        }
    };
    band_color(theme, t)
}

fn band_color(theme: &Theme, t: f64) -> Color {
    if !t.is_finite() || t < 1.0 / 3.0 {
        theme.primary
    } else if t < 2.0 / 3.0 {
        theme.secondary
    } else {
        theme.tertiary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemePreset;

    fn theme() -> Theme {
        ThemePreset::Neon.theme()
    }

    const VIEWPORT: Size = Size::new(900.0, 600.0);

    #[test]
    fn vertical_bands() {
        let t = theme();
        let at = |y| resolve(&t, ZoneStrategy::Vertical, Point::new(0.0, y), VIEWPORT);
        assert_eq!(at(0.0), t.primary);
        assert_eq!(at(199.0), t.primary);
        assert_eq!(at(300.0), t.secondary);
        assert_eq!(at(450.0), t.tertiary);
        assert_eq!(at(599.0), t.tertiary);
    }

    #[test]
    fn horizontal_bands() {
        let t = theme();
        let at = |x| resolve(&t, ZoneStrategy::Horizontal, Point::new(x, 0.0), VIEWPORT);
        assert_eq!(at(100.0), t.primary);
        assert_eq!(at(450.0), t.secondary);
        assert_eq!(at(899.0), t.tertiary);
    }

    #[test]
    fn radial_bands() {
        let t = theme();
        let center = Point::new(450.0, 300.0);
        assert_eq!(resolve(&t, ZoneStrategy::Radial, center, VIEWPORT), t.primary);
        // A corner is at normalized distance 1.0.
        assert_eq!(
            resolve(&t, ZoneStrategy::Radial, Point::new(0.0, 0.0), VIEWPORT),
            t.tertiary
        );
    }

    #[test]
    fn none_is_always_primary() {
        let t = theme();
        assert_eq!(
            resolve(&t, ZoneStrategy::None, Point::new(890.0, 590.0), VIEWPORT),
            t.primary
        );
    }

    #[test]
    fn degenerate_viewport_resolves_primary() {
        let t = theme();
        assert_eq!(
            resolve(
                &t,
                ZoneStrategy::Vertical,
                Point::new(0.0, 100.0),
                Size::ZERO
            ),
            t.primary
        );
        assert_eq!(
            resolve(&t, ZoneStrategy::Radial, Point::new(5.0, 5.0), Size::ZERO),
            t.primary
        );
    }
}
