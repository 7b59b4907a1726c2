// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearfield Registry: the set of elements participating in pointer effects.
//!
//! Consumers register a host node (anything implementing [`ElementNode`])
//! together with [`ElementOptions`] and get back an [`ElementId`], a
//! generational handle that stays valid until the element is unregistered or a
//! liveness sweep finds its node detached. The registry never owns the node's
//! lifecycle; it only observes bounds and attachment.
//!
//! Each cursor pass recomputes, for every candidate element, its cached
//! bounds, the Euclidean distance from the cursor to the bounds center,
//! whether the cursor is within the element's proximity radius, and whether it
//! is inside the element's rectangle (hover). State changes are reported as
//! edge-triggered [`ElementEvent`]s: steady state emits nothing, so callers
//! can dispatch callbacks directly without their own dedup.
//!
//! Candidate selection is a full scan while the registry is small and a
//! [`nearfield_grid::SpatialGrid`] neighborhood query above
//! [`DEFAULT_GRID_THRESHOLD`] elements; both paths produce identical result
//! sets. Elements that were in proximity or hovered on the previous pass are
//! always revisited so exit transitions fire even when the cursor has left
//! their grid neighborhood entirely.
//!
//! All validation is defensive: out-of-range option values are clamped with a
//! logged warning, NaN falls back to the documented default, and a node whose
//! bounds cannot be read mid-frame is logged and skipped for that frame only.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Point, Rect, Vec2};

use nearfield_grid::SpatialGrid;

/// Registry size above which candidate selection switches from a direct scan
/// to grid-backed neighborhood queries.
pub const DEFAULT_GRID_THRESHOLD: usize = 48;

/// Default per-element proximity radius when neither the element nor the
/// engine configuration supplies one.
pub const DEFAULT_PROXIMITY_RADIUS: f64 = 100.0;

/// Generational handle for a registered element.
///
/// Stale handles (outlived by an unregistration or sweep) are ignored by every
/// registry operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u32, u32);

impl ElementId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Element ids are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What kind of control an element is.
///
/// The kind scales perceived attraction force: small controls may visibly
/// jiggle, large structural surfaces should not.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ElementKind {
    /// A small clickable control.
    #[default]
    Button,
    /// A drag handle or draggable surface.
    Draggable,
    /// An inline link.
    Link,
    /// A large structural card.
    Card,
    /// Anything else.
    Custom,
}

/// Whether an element is displaced toward or away from the cursor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AttractionMode {
    /// No displacement.
    #[default]
    None,
    /// Pulled toward the cursor.
    Attract,
    /// Pushed away from the cursor.
    Repel,
}

/// Per-element registration options as supplied by the consumer.
///
/// Values are normalized on registration: `attraction_strength` and
/// `intensity` are clamped to `[0, 1]`, a negative `proximity_radius` is
/// clamped to zero, and NaN anywhere falls back to the documented default with
/// a logged warning.
#[derive(Clone, Debug)]
pub struct ElementOptions {
    /// Control kind, used for force scaling.
    pub kind: ElementKind,
    /// Proximity radius override; `None` uses the registry default.
    pub proximity_radius: Option<f64>,
    /// Displacement mode.
    pub attraction: AttractionMode,
    /// Displacement strength in `[0, 1]`.
    pub attraction_strength: f64,
    /// Effect intensity in `[0, 1]`.
    pub intensity: f64,
    /// Whether distortion effects apply to this element.
    pub distortion: bool,
}

impl Default for ElementOptions {
    fn default() -> Self {
        Self {
            kind: ElementKind::Button,
            proximity_radius: None,
            attraction: AttractionMode::None,
            attraction_strength: 0.5,
            intensity: 1.0,
            distortion: false,
        }
    }
}

/// A host node observed (never owned) by the registry.
///
/// This is the seam between the engine and whatever surface hosts the
/// elements; tests implement it with plain structs.
pub trait ElementNode {
    /// Current bounds, or `None` when they cannot be read (detached,
    /// mid-removal, zero-sized in a way the host cannot measure).
    fn bounds(&self) -> Option<Rect>;

    /// Whether the node is still attached to its document/surface.
    fn attached(&self) -> bool;
}

/// Per-element computed state, refreshed on each cursor pass that visits the
/// element.
#[derive(Clone, Debug)]
pub struct ElementData {
    /// Control kind.
    pub kind: ElementKind,
    /// Effective proximity radius (override or registry default).
    pub proximity_radius: f64,
    /// Displacement mode.
    pub attraction: AttractionMode,
    /// Displacement strength in `[0, 1]`.
    pub attraction_strength: f64,
    /// Effect intensity in `[0, 1]`.
    pub intensity: f64,
    /// Whether distortion applies.
    pub distortion: bool,
    /// Cached bounds from the last successful read.
    pub bounds: Rect,
    /// Euclidean distance from the cursor to the bounds center. Infinite when
    /// the node is detached or degenerate.
    pub distance: f64,
    /// Whether the cursor is within the proximity radius.
    pub in_proximity: bool,
    /// Whether the cursor point is inside the bounds rectangle.
    pub hovered: bool,
}

impl ElementData {
    /// Center of the cached bounds.
    pub fn center(&self) -> Point {
        Point::new(
            (self.bounds.x0 + self.bounds.x1) / 2.0,
            (self.bounds.y0 + self.bounds.y1) / 2.0,
        )
    }

    fn half_diagonal(&self) -> f64 {
        Vec2::new(self.bounds.width(), self.bounds.height()).hypot() / 2.0
    }
}

/// An edge-triggered element state transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ElementEvent {
    /// The element that changed state.
    pub id: ElementId,
    /// What changed.
    pub kind: ElementEventKind,
}

/// The state transition kinds the registry reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementEventKind {
    /// The cursor entered the proximity radius.
    ProximityEnter,
    /// The cursor left the proximity radius.
    ProximityExit,
    /// The cursor point entered the element rectangle.
    HoverStart,
    /// The cursor point left the element rectangle.
    HoverEnd,
}

struct Entry {
    generation: u32,
    node: Box<dyn ElementNode>,
    data: ElementData,
    in_grid: bool,
}

impl core::fmt::Debug for Entry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Entry")
            .field("generation", &self.generation)
            .field("data", &self.data)
            .field("in_grid", &self.in_grid)
            .finish_non_exhaustive()
    }
}

/// The element registry.
#[derive(Debug)]
pub struct ElementRegistry {
    entries: Vec<Option<Entry>>,
    // Freed slots with the generation they held at removal, so a reused slot
    // bumps past every handle ever issued for it.
    free_list: Vec<(usize, u32)>,
    live: usize,
    grid: SpatialGrid,
    grid_threshold: usize,
    default_radius: f64,
    // Largest "reach" (radius or bounds half-diagonal) among live elements.
    // Grid queries use this so no in-range or hovered element can fall outside
    // the searched neighborhood. Grows inline; fully recomputed on removals.
    max_reach: f64,
}

impl ElementRegistry {
    /// Create a registry with the given default proximity radius and grid
    /// cell size.
    pub fn new(default_radius: f64, cell_size: f64) -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            grid: SpatialGrid::new(cell_size),
            grid_threshold: DEFAULT_GRID_THRESHOLD,
            default_radius,
            max_reach: 0.0,
        }
    }

    /// Override the direct-scan/grid crossover threshold.
    pub fn set_grid_threshold(&mut self, threshold: usize) {
        self.grid_threshold = threshold;
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Register a node. Returns `None` (with a logged warning) when the node
    /// is already detached.
    pub fn register(
        &mut self,
        node: Box<dyn ElementNode>,
        options: ElementOptions,
    ) -> Option<ElementId> {
        if !node.attached() {
            log::warn!("nearfield: rejecting registration of a detached node");
            return None;
        }

        let radius = normalize_radius(options.proximity_radius, self.default_radius);
        let data = ElementData {
            kind: options.kind,
            proximity_radius: radius,
            attraction: options.attraction,
            attraction_strength: clamp_unit(
                options.attraction_strength,
                0.5,
                "attraction_strength",
            ),
            intensity: clamp_unit(options.intensity, 1.0, "intensity"),
            distortion: options.distortion,
            bounds: node.bounds().unwrap_or(Rect::ZERO),
            distance: f64::INFINITY,
            in_proximity: false,
            hovered: false,
        };

        let entry = Entry {
            generation: 0,
            node,
            data,
            in_grid: false,
        };
        let (idx, generation) = if let Some((idx, freed_generation)) = self.free_list.pop() {
            let generation = freed_generation.wrapping_add(1);
            self.entries[idx] = Some(Entry { generation, ..entry });
            (idx, generation)
        } else {
            self.entries.push(Some(Entry {
                generation: 1,
                ..entry
            }));
            (self.entries.len() - 1, 1)
        };
        self.live += 1;

        let e = self.entries[idx].as_mut().expect("just inserted");
        if is_measurable(&e.data.bounds) {
            let c = e.data.center();
            self.grid.insert(idx, c.x, c.y);
            e.in_grid = true;
        }
        self.max_reach = self.max_reach.max(reach_of(&e.data));

        Some(ElementId::new(idx, generation))
    }

    /// Unregister an element. Stale ids are ignored.
    pub fn unregister(&mut self, id: ElementId) {
        let idx = id.idx();
        let Some(slot) = self.entries.get_mut(idx) else {
            return;
        };
        let Some(entry) = slot else {
            return;
        };
        if entry.generation != id.1 {
            return;
        }
        let freed_generation = entry.generation;
        if entry.in_grid {
            self.grid.remove(idx);
        }
        *slot = None;
        self.free_list.push((idx, freed_generation));
        self.live -= 1;
        self.recompute_reach();
    }

    /// Look up the computed state for an element.
    pub fn element(&self, id: ElementId) -> Option<&ElementData> {
        let entry = self.entries.get(id.idx())?.as_ref()?;
        (entry.generation == id.1).then_some(&entry.data)
    }

    /// Iterate over all live elements.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &ElementData)> {
        self.entries.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|e| (ElementId::new(idx, e.generation), &e.data))
        })
    }

    /// Ids of elements currently in proximity, in slot order.
    pub fn active_ids(&self) -> Vec<ElementId> {
        self.iter()
            .filter(|(_, d)| d.in_proximity)
            .map(|(id, _)| id)
            .collect()
    }

    /// Recompute proximity/hover state for the elements near `cursor`.
    ///
    /// Returns the edge-triggered transitions in slot order. Elements whose
    /// bounds cannot be read are logged and skipped for this pass.
    pub fn update_cursor(&mut self, cursor: Point) -> Vec<ElementEvent> {
        let candidates = self.candidates(cursor);
        let mut events = Vec::new();

        for idx in candidates {
            let Some(Some(entry)) = self.entries.get_mut(idx) else {
                continue;
            };
            let id = ElementId::new(idx, entry.generation);

            let Some(bounds) = entry.node.bounds() else {
                // Node vanished mid-frame; the sweep will collect it.
                log::warn!("nearfield: element {id:?} bounds unreadable, skipping this frame");
                continue;
            };
            entry.data.bounds = bounds;

            if is_measurable(&bounds) {
                let c = entry.data.center();
                // Incremental membership refresh; far-away elements are not
                // visited here, which the periodic grid rebuild backstops.
                self.grid.update(idx, c.x, c.y);
                entry.in_grid = true;
                entry.data.distance = (cursor - c).hypot();
            } else {
                if entry.in_grid {
                    self.grid.remove(idx);
                    entry.in_grid = false;
                }
                entry.data.distance = f64::INFINITY;
            }

            let was_in_proximity = entry.data.in_proximity;
            let was_hovered = entry.data.hovered;
            entry.data.in_proximity = entry.data.distance <= entry.data.proximity_radius;
            entry.data.hovered =
                is_measurable(&entry.data.bounds) && entry.data.bounds.contains(cursor);
            self.max_reach = self.max_reach.max(reach_of(&entry.data));

            match (was_in_proximity, entry.data.in_proximity) {
                (false, true) => events.push(ElementEvent {
                    id,
                    kind: ElementEventKind::ProximityEnter,
                }),
                (true, false) => events.push(ElementEvent {
                    id,
                    kind: ElementEventKind::ProximityExit,
                }),
                _ => {}
            }
            match (was_hovered, entry.data.hovered) {
                (false, true) => events.push(ElementEvent {
                    id,
                    kind: ElementEventKind::HoverStart,
                }),
                (true, false) => events.push(ElementEvent {
                    id,
                    kind: ElementEventKind::HoverEnd,
                }),
                _ => {}
            }
        }

        events
    }

    /// Remove every element whose node has been detached without an explicit
    /// unregistration. Returns the removed ids.
    pub fn sweep(&mut self) -> Vec<ElementId> {
        let mut removed = Vec::new();
        for idx in 0..self.entries.len() {
            let detached = match &self.entries[idx] {
                Some(e) => !e.node.attached(),
                None => false,
            };
            if detached {
                let entry = self.entries[idx].take().expect("checked above");
                if entry.in_grid {
                    self.grid.remove(idx);
                }
                self.free_list.push((idx, entry.generation));
                self.live -= 1;
                removed.push(ElementId::new(idx, entry.generation));
            }
        }
        if !removed.is_empty() {
            log::warn!(
                "nearfield: liveness sweep removed {} detached element(s)",
                removed.len()
            );
            self.recompute_reach();
        }
        removed
    }

    /// Rebuild the grid from scratch out of the authoritative element set.
    ///
    /// Incremental per-frame updates only touch elements near the cursor, so
    /// cell membership can drift; invoking this on a fixed cadence restores
    /// exact membership.
    pub fn rebuild_grid(&mut self) {
        let mut entries = Vec::new();
        for (idx, slot) in self.entries.iter_mut().enumerate() {
            let Some(e) = slot else { continue };
            if let Some(bounds) = e.node.bounds() {
                e.data.bounds = bounds;
            }
            if is_measurable(&e.data.bounds) {
                let c = e.data.center();
                entries.push((idx, c.x, c.y));
                e.in_grid = true;
            } else {
                e.in_grid = false;
            }
        }
        self.grid.rebuild(entries);
        self.recompute_reach();
    }

    fn candidates(&self, cursor: Point) -> Vec<usize> {
        let mut out: Vec<usize> = if self.live <= self.grid_threshold {
            self.entries
                .iter()
                .enumerate()
                .filter_map(|(idx, slot)| slot.as_ref().map(|_| idx))
                .collect()
        } else {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            self.grid
                .visit_nearby(cursor.x, cursor.y, self.max_reach, |slot| {
                    if seen.insert(slot) {
                        out.push(slot);
                    }
                });
            // Elements still flagged from the previous pass are always
            // revisited so their exit transitions fire even when the cursor
            // has left their neighborhood.
            for (idx, slot) in self.entries.iter().enumerate() {
                if let Some(e) = slot
                    && (e.data.in_proximity || e.data.hovered)
                    && seen.insert(idx)
                {
                    out.push(idx);
                }
            }
            out
        };
        out.sort_unstable();
        out
    }

    fn recompute_reach(&mut self) {
        self.max_reach = self
            .entries
            .iter()
            .flatten()
            .map(|e| reach_of(&e.data))
            .fold(0.0, f64::max);
    }
}

fn is_measurable(bounds: &Rect) -> bool {
    bounds.width() > 0.0 && bounds.height() > 0.0
}

fn reach_of(data: &ElementData) -> f64 {
    data.proximity_radius.max(data.half_diagonal())
}

/// Clamp a unit-interval setting, warning on out-of-range or NaN input.
///
/// `what` names the setting in the warning. NaN falls back to `default`.
pub fn clamp_unit(value: f64, default: f64, what: &str) -> f64 {
    if value.is_nan() {
        log::warn!("nearfield: {what} is NaN, using default {default}");
        return default;
    }
    if !(0.0..=1.0).contains(&value) {
        let clamped = value.clamp(0.0, 1.0);
        log::warn!("nearfield: {what} {value} outside [0, 1], clamping to {clamped}");
        return clamped;
    }
    value
}

/// Normalize a proximity radius: `None` means `default`, NaN falls back to
/// `default` with a warning, negatives clamp to zero with a warning.
pub fn normalize_radius(radius: Option<f64>, default: f64) -> f64 {
    match radius {
        None => default,
        Some(r) if r.is_nan() => {
            log::warn!("nearfield: proximity_radius is NaN, using default {default}");
            default
        }
        Some(r) if r < 0.0 => {
            log::warn!("nearfield: proximity_radius {r} is negative, clamping to 0");
            0.0
        }
        Some(r) => r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[derive(Clone)]
    struct FakeNode {
        bounds: Rc<Cell<Option<Rect>>>,
        attached: Rc<Cell<bool>>,
    }

    impl FakeNode {
        fn at(rect: Rect) -> Self {
            Self {
                bounds: Rc::new(Cell::new(Some(rect))),
                attached: Rc::new(Cell::new(true)),
            }
        }
    }

    impl ElementNode for FakeNode {
        fn bounds(&self) -> Option<Rect> {
            self.bounds.get()
        }

        fn attached(&self) -> bool {
            self.attached.get()
        }
    }

    fn registry() -> ElementRegistry {
        ElementRegistry::new(DEFAULT_PROXIMITY_RADIUS, 200.0)
    }

    #[test]
    fn detached_node_is_rejected() {
        let mut reg = registry();
        let node = FakeNode::at(Rect::new(0.0, 0.0, 10.0, 10.0));
        node.attached.set(false);
        assert!(
            reg.register(Box::new(node), ElementOptions::default())
                .is_none()
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn options_are_clamped_and_nan_falls_back() {
        let mut reg = registry();
        let node = FakeNode::at(Rect::new(0.0, 0.0, 10.0, 10.0));
        let id = reg
            .register(
                Box::new(node),
                ElementOptions {
                    attraction_strength: 3.0,
                    intensity: f64::NAN,
                    proximity_radius: Some(-20.0),
                    ..Default::default()
                },
            )
            .unwrap();
        let data = reg.element(id).unwrap();
        assert_eq!(data.attraction_strength, 1.0);
        assert_eq!(data.intensity, 1.0);
        assert_eq!(data.proximity_radius, 0.0);
    }

    #[test]
    fn distance_matches_euclidean_distance() {
        let mut reg = registry();
        let node = FakeNode::at(Rect::new(100.0, 100.0, 150.0, 150.0));
        let id = reg
            .register(Box::new(node), ElementOptions::default())
            .unwrap();
        reg.update_cursor(Point::new(120.0, 120.0));
        let data = reg.element(id).unwrap();
        // Center is (125, 125); cursor (120, 120).
        let expected = Vec2::new(5.0, 5.0).hypot();
        assert!((data.distance - expected).abs() < 1e-9);
    }

    #[test]
    fn proximity_and_hover_transitions_fire_exactly_once() {
        let mut reg = registry();
        let node = FakeNode::at(Rect::new(100.0, 100.0, 150.0, 150.0));
        let id = reg
            .register(
                Box::new(node),
                ElementOptions {
                    proximity_radius: Some(150.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let events = reg.update_cursor(Point::new(120.0, 120.0));
        assert_eq!(
            events,
            [
                ElementEvent {
                    id,
                    kind: ElementEventKind::ProximityEnter
                },
                ElementEvent {
                    id,
                    kind: ElementEventKind::HoverStart
                },
            ]
        );
        let data = reg.element(id).unwrap();
        assert!(data.in_proximity);
        assert!(data.hovered);

        // Steady state: no repeats.
        assert!(reg.update_cursor(Point::new(121.0, 121.0)).is_empty());

        let events = reg.update_cursor(Point::new(400.0, 400.0));
        assert_eq!(
            events,
            [
                ElementEvent {
                    id,
                    kind: ElementEventKind::ProximityExit
                },
                ElementEvent {
                    id,
                    kind: ElementEventKind::HoverEnd
                },
            ]
        );
        assert!(reg.update_cursor(Point::new(401.0, 401.0)).is_empty());
    }

    #[test]
    fn grid_and_direct_scan_agree() {
        // 60 elements forces the grid path; a clone forced to direct scan
        // must compute the same active set.
        let mut grid_reg = registry();
        let mut scan_reg = registry();
        scan_reg.set_grid_threshold(usize::MAX);
        assert!(60 > DEFAULT_GRID_THRESHOLD, "test must exceed the threshold");

        let mut grid_ids = Vec::new();
        let mut scan_ids = Vec::new();
        for i in 0..60 {
            let x = ((i % 10) * 120) as f64;
            let y = ((i / 10) * 120) as f64;
            let rect = Rect::new(x, y, x + 40.0, y + 40.0);
            grid_ids.push(
                grid_reg
                    .register(Box::new(FakeNode::at(rect)), ElementOptions::default())
                    .unwrap(),
            );
            scan_ids.push(
                scan_reg
                    .register(Box::new(FakeNode::at(rect)), ElementOptions::default())
                    .unwrap(),
            );
        }

        let cursor = Point::new(250.0, 250.0);
        grid_reg.update_cursor(cursor);
        scan_reg.update_cursor(cursor);

        let near_grid: Vec<usize> = grid_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| grid_reg.element(**id).unwrap().in_proximity)
            .map(|(i, _)| i)
            .collect();
        let near_scan: Vec<usize> = scan_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| scan_reg.element(**id).unwrap().in_proximity)
            .map(|(i, _)| i)
            .collect();
        assert!(!near_scan.is_empty(), "cursor should be near something");
        assert_eq!(near_grid, near_scan);
    }

    #[test]
    fn grid_path_still_fires_exits_for_far_elements() {
        let mut reg = registry();
        reg.set_grid_threshold(0); // Force the grid path.
        let node = FakeNode::at(Rect::new(0.0, 0.0, 40.0, 40.0));
        let id = reg
            .register(Box::new(node), ElementOptions::default())
            .unwrap();

        reg.update_cursor(Point::new(20.0, 20.0));
        assert!(reg.element(id).unwrap().in_proximity);

        // Far across the surface: the element's cell is outside the searched
        // neighborhood, but it must still be revisited to emit the exit.
        let events = reg.update_cursor(Point::new(5000.0, 5000.0));
        assert!(
            events
                .iter()
                .any(|e| e.kind == ElementEventKind::ProximityExit),
            "exit must fire even off-neighborhood"
        );
        assert!(!reg.element(id).unwrap().in_proximity);
    }

    #[test]
    fn sweep_removes_detached_nodes() {
        let mut reg = registry();
        let keep = FakeNode::at(Rect::new(0.0, 0.0, 10.0, 10.0));
        let drop = FakeNode::at(Rect::new(50.0, 50.0, 60.0, 60.0));
        let keep_id = reg
            .register(Box::new(keep), ElementOptions::default())
            .unwrap();
        let drop_id = reg
            .register(Box::new(drop.clone()), ElementOptions::default())
            .unwrap();

        drop.attached.set(false);
        let removed = reg.sweep();
        assert_eq!(removed, [drop_id]);
        assert!(reg.element(drop_id).is_none());
        assert!(reg.element(keep_id).is_some());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn stale_ids_are_ignored_after_slot_reuse() {
        let mut reg = registry();
        let a = reg
            .register(
                Box::new(FakeNode::at(Rect::new(0.0, 0.0, 10.0, 10.0))),
                ElementOptions::default(),
            )
            .unwrap();
        reg.unregister(a);
        let b = reg
            .register(
                Box::new(FakeNode::at(Rect::new(0.0, 0.0, 10.0, 10.0))),
                ElementOptions::default(),
            )
            .unwrap();
        // Same slot, new generation.
        assert!(reg.element(a).is_none());
        assert!(reg.element(b).is_some());
        reg.unregister(a); // No effect on the new occupant.
        assert!(reg.element(b).is_some());
    }

    #[test]
    fn slots_freed_by_sweep_also_bump_generations() {
        let mut reg = registry();
        let node = FakeNode::at(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = reg
            .register(Box::new(node.clone()), ElementOptions::default())
            .unwrap();
        node.attached.set(false);
        assert_eq!(reg.sweep(), [a]);

        let b = reg
            .register(
                Box::new(FakeNode::at(Rect::new(0.0, 0.0, 10.0, 10.0))),
                ElementOptions::default(),
            )
            .unwrap();
        assert!(reg.element(a).is_none());
        reg.unregister(a);
        assert!(reg.element(b).is_some(), "swept handle must not alias");
    }

    #[test]
    fn unreadable_bounds_skip_the_frame_but_keep_the_element() {
        let mut reg = registry();
        let node = FakeNode::at(Rect::new(0.0, 0.0, 40.0, 40.0));
        let id = reg
            .register(Box::new(node.clone()), ElementOptions::default())
            .unwrap();
        reg.update_cursor(Point::new(20.0, 20.0));
        assert!(reg.element(id).unwrap().in_proximity);

        node.bounds.set(None);
        let events = reg.update_cursor(Point::new(20.0, 20.0));
        // Skipped for the frame: no transition, state untouched.
        assert!(events.is_empty());
        assert!(reg.element(id).unwrap().in_proximity);
    }

    #[test]
    fn validation_helpers_cover_edge_inputs() {
        assert_eq!(clamp_unit(0.4, 1.0, "x"), 0.4);
        assert_eq!(clamp_unit(f64::NAN, 0.7, "x"), 0.7);
        assert_eq!(clamp_unit(5.0, 1.0, "x"), 1.0);
        assert_eq!(normalize_radius(None, 100.0), 100.0);
        assert_eq!(normalize_radius(Some(f64::NAN), 100.0), 100.0);
        assert_eq!(normalize_radius(Some(-3.0), 100.0), 0.0);
        assert_eq!(normalize_radius(Some(80.0), 100.0), 80.0);
    }

    #[test]
    fn zero_sized_bounds_mean_infinite_distance() {
        let mut reg = registry();
        let node = FakeNode::at(Rect::new(10.0, 10.0, 10.0, 10.0));
        let id = reg
            .register(Box::new(node), ElementOptions::default())
            .unwrap();
        reg.update_cursor(Point::new(10.0, 10.0));
        let data = reg.element(id).unwrap();
        assert!(data.distance.is_infinite());
        assert!(!data.in_proximity);
        assert!(!data.hovered);
    }
}
