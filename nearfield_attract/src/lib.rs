// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearfield Attract: displacement forces for elements near the cursor.
//!
//! For every element with an attraction mode, the engine computes a force
//! whose magnitude falls off linearly from the element's proximity radius:
//!
//! ```text
//! magnitude = ((radius − distance) / radius) × strength × BASE_FORCE × kind_multiplier
//! ```
//!
//! The displacement points along the cursor→center axis, negated for attract
//! (element pulled toward the cursor) and positive for repel. Element kinds
//! scale the perceived force so small controls respond visibly while large
//! structural cards barely shift.
//!
//! Displacement is applied through [`TransformHost`], the one deliberately
//! imperative seam in the system. Hosts map it onto whatever continuous,
//! high-frequency mutation channel they have, such as eased style transforms
//! on a web surface. The engine tracks every
//! element it has displaced; [`AttractionEngine::reset`] clears them all, so
//! disabling the engine leaves no residual mutation behind. A host failure on
//! one element is logged and skipped without disturbing the rest of the pass.

#![no_std]

#[cfg(test)]
extern crate alloc;

use hashbrown::HashSet;
use kurbo::Point;

use nearfield_registry::{AttractionMode, ElementData, ElementId, ElementKind};

/// Base displacement in surface units at zero distance, full strength,
/// multiplier 1.0.
pub const BASE_FORCE: f64 = 30.0;

/// Per-kind force multiplier.
///
/// Small controls read as playful when they move; large structural surfaces
/// should not visibly jiggle.
pub fn kind_multiplier(kind: ElementKind) -> f64 {
    match kind {
        ElementKind::Button => 1.5,
        ElementKind::Draggable => 1.3,
        ElementKind::Link => 1.1,
        ElementKind::Card => 0.65,
        ElementKind::Custom => 1.0,
    }
}

/// A transform mutation the host could not carry out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransformError;

impl core::fmt::Display for TransformError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("host could not apply the transform")
    }
}

/// The imperative seam through which displacement reaches host nodes.
///
/// Kept narrow on purpose: two operations, no styling vocabulary. Hosts
/// translate offsets into whatever their rendering layer needs; tests record
/// them in a map.
pub trait TransformHost {
    /// Displace the element by `(dx, dy)` surface units.
    fn apply_transform(&mut self, id: ElementId, dx: f64, dy: f64) -> Result<(), TransformError>;

    /// Remove any displacement previously applied to the element.
    ///
    /// Best-effort; called for elements leaving range and for every touched
    /// element on reset.
    fn clear_transform(&mut self, id: ElementId);
}

/// Computes and applies displacement forces, remembering what it touched.
#[derive(Debug, Default)]
pub struct AttractionEngine {
    touched: HashSet<ElementId>,
}

impl AttractionEngine {
    /// Create an engine with no touched elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements currently displaced.
    pub fn touched_len(&self) -> usize {
        self.touched.len()
    }

    /// Run one force pass over the given elements.
    ///
    /// Elements without an attraction mode are ignored. Elements with one that
    /// are out of range relax back: any previous displacement is cleared.
    pub fn apply<'a, I>(&mut self, host: &mut dyn TransformHost, cursor: Point, elements: I)
    where
        I: IntoIterator<Item = (ElementId, &'a ElementData)>,
    {
        for (id, data) in elements {
            if data.attraction == AttractionMode::None {
                continue;
            }

            let radius = data.proximity_radius;
            let in_range = radius > 0.0 && data.distance.is_finite() && data.distance <= radius;
            if !in_range {
                if self.touched.remove(&id) {
                    host.clear_transform(id);
                }
                continue;
            }

            let center = data.center();
            let axis = center - cursor;
            let len = axis.hypot();
            if len == 0.0 {
                // Cursor exactly on the center: direction undefined.
                continue;
            }

            let magnitude = ((radius - data.distance) / radius)
                * data.attraction_strength
                * BASE_FORCE
                * kind_multiplier(data.kind);
            let offset = match data.attraction {
                AttractionMode::Attract => axis * (-magnitude / len),
                AttractionMode::Repel => axis * (magnitude / len),
                AttractionMode::None => unreachable!("filtered above"),
            };

            match host.apply_transform(id, offset.x, offset.y) {
                Ok(()) => {
                    self.touched.insert(id);
                }
                Err(err) => {
                    log::warn!("nearfield: transform on {id:?} failed ({err}), skipping");
                }
            }
        }
    }

    /// Clear the displacement on every element this engine has touched.
    ///
    /// After this returns no mutation from the engine remains on any node;
    /// call it on disablement and teardown.
    pub fn reset(&mut self, host: &mut dyn TransformHost) {
        for id in self.touched.drain() {
            host.clear_transform(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::vec::Vec;
    use hashbrown::HashMap;
    use kurbo::Rect;
    use nearfield_registry::{ElementNode, ElementOptions, ElementRegistry};

    #[derive(Default)]
    struct RecordingHost {
        offsets: HashMap<ElementId, (f64, f64)>,
        fail: HashSet<ElementId>,
    }

    impl TransformHost for RecordingHost {
        fn apply_transform(
            &mut self,
            id: ElementId,
            dx: f64,
            dy: f64,
        ) -> Result<(), TransformError> {
            if self.fail.contains(&id) {
                return Err(TransformError);
            }
            self.offsets.insert(id, (dx, dy));
            Ok(())
        }

        fn clear_transform(&mut self, id: ElementId) {
            self.offsets.remove(&id);
        }
    }

    struct StaticNode(Rect);

    impl ElementNode for StaticNode {
        fn bounds(&self) -> Option<Rect> {
            Some(self.0)
        }

        fn attached(&self) -> bool {
            true
        }
    }

    fn setup(opts: Vec<(Rect, ElementOptions)>) -> (ElementRegistry, Vec<ElementId>) {
        let mut reg = ElementRegistry::new(100.0, 200.0);
        let ids = opts
            .into_iter()
            .map(|(rect, o)| reg.register(Box::new(StaticNode(rect)), o).unwrap())
            .collect();
        (reg, ids)
    }

    fn attract_opts(kind: ElementKind, strength: f64) -> ElementOptions {
        ElementOptions {
            kind,
            attraction: AttractionMode::Attract,
            attraction_strength: strength,
            ..Default::default()
        }
    }

    #[test]
    fn attract_pulls_toward_cursor_with_linear_falloff() {
        // Element centered at (50, 0), radius 100; cursor at origin.
        let (mut reg, ids) = setup(alloc::vec![(
            Rect::new(30.0, -20.0, 70.0, 20.0),
            attract_opts(ElementKind::Custom, 1.0),
        )]);
        let cursor = Point::ZERO;
        reg.update_cursor(cursor);

        let mut host = RecordingHost::default();
        let mut engine = AttractionEngine::new();
        engine.apply(&mut host, cursor, reg.iter());

        let (dx, dy) = host.offsets[&ids[0]];
        // distance 50, radius 100 → falloff 0.5 → 15 units toward the cursor.
        assert!((dx + 15.0).abs() < 1e-9, "dx = {dx}");
        assert!(dy.abs() < 1e-9);
    }

    #[test]
    fn repel_flips_the_sign() {
        let (mut reg, ids) = setup(alloc::vec![(
            Rect::new(30.0, -20.0, 70.0, 20.0),
            ElementOptions {
                attraction: AttractionMode::Repel,
                ..attract_opts(ElementKind::Custom, 1.0)
            },
        )]);
        let cursor = Point::ZERO;
        reg.update_cursor(cursor);

        let mut host = RecordingHost::default();
        let mut engine = AttractionEngine::new();
        engine.apply(&mut host, cursor, reg.iter());

        let (dx, _) = host.offsets[&ids[0]];
        assert!(dx > 0.0, "repel should push away, dx = {dx}");
    }

    #[test]
    fn cards_move_less_than_buttons() {
        let rect_a = Rect::new(30.0, -20.0, 70.0, 20.0);
        let rect_b = Rect::new(-70.0, -20.0, -30.0, 20.0);
        let (mut reg, ids) = setup(alloc::vec![
            (rect_a, attract_opts(ElementKind::Button, 1.0)),
            (rect_b, attract_opts(ElementKind::Card, 1.0)),
        ]);
        let cursor = Point::ZERO;
        reg.update_cursor(cursor);

        let mut host = RecordingHost::default();
        let mut engine = AttractionEngine::new();
        engine.apply(&mut host, cursor, reg.iter());

        let button = host.offsets[&ids[0]].0.abs();
        let card = host.offsets[&ids[1]].0.abs();
        assert!(button > card, "button {button} should out-move card {card}");
        let ratio = kind_multiplier(ElementKind::Button) / kind_multiplier(ElementKind::Card);
        assert!((button / card - ratio).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_elements_relax_back() {
        let (mut reg, ids) = setup(alloc::vec![(
            Rect::new(30.0, -20.0, 70.0, 20.0),
            attract_opts(ElementKind::Custom, 1.0),
        )]);
        let mut host = RecordingHost::default();
        let mut engine = AttractionEngine::new();

        reg.update_cursor(Point::ZERO);
        engine.apply(&mut host, Point::ZERO, reg.iter());
        assert!(host.offsets.contains_key(&ids[0]));

        let far = Point::new(1000.0, 1000.0);
        reg.update_cursor(far);
        engine.apply(&mut host, far, reg.iter());
        assert!(!host.offsets.contains_key(&ids[0]));
        assert_eq!(engine.touched_len(), 0);
    }

    #[test]
    fn reset_clears_every_touched_element() {
        let (mut reg, _ids) = setup(alloc::vec![
            (
                Rect::new(30.0, -20.0, 70.0, 20.0),
                attract_opts(ElementKind::Button, 1.0),
            ),
            (
                Rect::new(-70.0, -20.0, -30.0, 20.0),
                attract_opts(ElementKind::Link, 1.0),
            ),
        ]);
        let cursor = Point::ZERO;
        reg.update_cursor(cursor);

        let mut host = RecordingHost::default();
        let mut engine = AttractionEngine::new();
        engine.apply(&mut host, cursor, reg.iter());
        assert_eq!(host.offsets.len(), 2);

        engine.reset(&mut host);
        assert!(host.offsets.is_empty());
        assert_eq!(engine.touched_len(), 0);
    }

    #[test]
    fn host_failure_skips_only_that_element() {
        let (mut reg, ids) = setup(alloc::vec![
            (
                Rect::new(30.0, -20.0, 70.0, 20.0),
                attract_opts(ElementKind::Button, 1.0),
            ),
            (
                Rect::new(-70.0, -20.0, -30.0, 20.0),
                attract_opts(ElementKind::Button, 1.0),
            ),
        ]);
        let cursor = Point::ZERO;
        reg.update_cursor(cursor);

        let mut host = RecordingHost::default();
        host.fail.insert(ids[0]);
        let mut engine = AttractionEngine::new();
        engine.apply(&mut host, cursor, reg.iter());

        assert!(!host.offsets.contains_key(&ids[0]));
        assert!(host.offsets.contains_key(&ids[1]));
        assert_eq!(engine.touched_len(), 1);
    }

    #[test]
    fn cursor_on_center_applies_nothing() {
        let (mut reg, ids) = setup(alloc::vec![(
            Rect::new(-20.0, -20.0, 20.0, 20.0),
            attract_opts(ElementKind::Custom, 1.0),
        )]);
        let cursor = Point::ZERO;
        reg.update_cursor(cursor);

        let mut host = RecordingHost::default();
        let mut engine = AttractionEngine::new();
        engine.apply(&mut host, cursor, reg.iter());
        assert!(!host.offsets.contains_key(&ids[0]));
    }
}
