// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearfield Grid: a uniform spatial grid for pointer proximity queries.
//!
//! Elements are bucketed by the grid cell containing their bounds center, one
//! cell per element. Queries visit the square cell neighborhood covering a
//! radius around a point and report every slot found there. Results are a
//! superset of the true matches: false positives are expected and filtered by
//! the caller, false negatives never occur for an element whose recorded
//! center is within the query radius.
//!
//! The grid is a throughput structure, not a source of truth. Callers that
//! update entries incrementally (and may skip far-away entries) should
//! periodically call [`SpatialGrid::rebuild`] from their authoritative element
//! set to clear out any drift.
//!
//! # Example
//!
//! ```rust
//! use nearfield_grid::SpatialGrid;
//!
//! let mut grid = SpatialGrid::new(200.0);
//! grid.insert(0, 120.0, 130.0);
//! grid.insert(1, 900.0, 900.0);
//!
//! let near: Vec<_> = grid.nearby(100.0, 100.0, 150.0).collect();
//! assert!(near.contains(&0));
//! assert!(!near.contains(&1));
//! ```

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Default cell size, chosen to be comfortably larger than typical proximity
/// radii so most queries touch a 3×3 neighborhood.
pub const DEFAULT_CELL_SIZE: f64 = 200.0;

/// Map a coordinate to a grid cell coordinate along one axis.
///
/// Floors toward −∞ and saturates values outside the `i32` range, so extreme
/// or subnormal-adjacent inputs cannot wrap.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
)]
#[inline]
pub fn cell_coord(value: f64, cell_size: f64) -> i32 {
    debug_assert!(cell_size > 0.0, "grid cell_size must be strictly positive");
    let t = value / cell_size;
    if t >= i32::MAX as f64 {
        return i32::MAX;
    }
    if t <= i32::MIN as f64 {
        return i32::MIN;
    }
    let coord = t as i32;

    // Round towards -∞ (the cast above has already truncated).
    if t < 0.0 && f64::from(coord) > t {
        coord.saturating_sub(1)
    } else {
        coord
    }
}

#[derive(Default)]
struct Cell {
    slots: SmallVec<[usize; 8]>,
}

/// Uniform grid over element bounds centers.
///
/// Slots are caller-managed indices (typically the storage index of a
/// registered element). A slot lives in exactly one cell at a time.
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i32, i32), Cell>,
    // Current cell per live slot, for O(1) moves and removals.
    homes: HashMap<usize, (i32, i32)>,
}

impl core::fmt::Debug for SpatialGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialGrid")
            .field("cell_size", &self.cell_size)
            .field("slots", &self.homes.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl SpatialGrid {
    /// Create a grid with the given cell size.
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be strictly positive");
        Self {
            cell_size,
            cells: HashMap::new(),
            homes: HashMap::new(),
        }
    }

    /// The configured cell size.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of slots currently in the grid.
    pub fn len(&self) -> usize {
        self.homes.len()
    }

    /// Whether the grid holds no slots.
    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    fn cell_of(&self, x: f64, y: f64) -> (i32, i32) {
        (cell_coord(x, self.cell_size), cell_coord(y, self.cell_size))
    }

    fn unlink(&mut self, slot: usize, home: (i32, i32)) {
        if let Some(cell) = self.cells.get_mut(&home) {
            if let Some(pos) = cell.slots.iter().position(|&s| s == slot) {
                cell.slots.swap_remove(pos);
            }
            // Dropping empty cells keeps the map compact for sparse grids.
            if cell.slots.is_empty() {
                self.cells.remove(&home);
            }
        }
    }

    /// Insert a slot at the given center coordinates.
    ///
    /// If the slot is already present it is moved, as by [`SpatialGrid::update`].
    pub fn insert(&mut self, slot: usize, cx: f64, cy: f64) {
        let home = self.cell_of(cx, cy);
        if let Some(old) = self.homes.insert(slot, home) {
            if old == home {
                return;
            }
            self.unlink(slot, old);
        }
        self.cells.entry(home).or_default().slots.push(slot);
    }

    /// Move a slot to new center coordinates.
    ///
    /// Cheap when the center stays within its current cell; a slot not yet in
    /// the grid is inserted.
    pub fn update(&mut self, slot: usize, cx: f64, cy: f64) {
        self.insert(slot, cx, cy);
    }

    /// Remove a slot from the grid. Unknown slots are ignored.
    pub fn remove(&mut self, slot: usize) {
        if let Some(home) = self.homes.remove(&slot) {
            self.unlink(slot, home);
        }
    }

    /// Drop all slots and cells.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.homes.clear();
    }

    /// Clear and reinsert every entry.
    ///
    /// Incremental updates may skip entries far from the cursor, so cells can
    /// drift from the authoritative element set between frames. A periodic
    /// rebuild from that set restores exact membership.
    pub fn rebuild<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (usize, f64, f64)>,
    {
        self.clear();
        for (slot, cx, cy) in entries {
            self.insert(slot, cx, cy);
        }
    }

    /// Visit every slot recorded in the cell neighborhood covering `radius`
    /// around `(x, y)`.
    ///
    /// The neighborhood is the `(2·cell_radius+1)²` block of cells centered
    /// on the query cell, where `cell_radius` covers `radius/cell_size`.
    /// Slots are reported at most once, in no particular order. The caller
    /// filters by true distance.
    pub fn visit_nearby<F: FnMut(usize)>(&self, x: f64, y: f64, radius: f64, mut f: F) {
        let radius = radius.max(0.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "The cell radius is clamped to a small neighborhood span."
        )]
        // Truncation plus one covers the fractional cell without `ceil`,
        // which is unavailable without `std`.
        let cell_radius = ((radius / self.cell_size).min(i32::MAX as f64 - 1.0) as i32)
            .saturating_add(1);
        let (cx, cy) = self.cell_of(x, y);

        for ix in cx.saturating_sub(cell_radius)..=cx.saturating_add(cell_radius) {
            for iy in cy.saturating_sub(cell_radius)..=cy.saturating_add(cell_radius) {
                if let Some(cell) = self.cells.get(&(ix, iy)) {
                    for &slot in &cell.slots {
                        f(slot);
                    }
                }
            }
        }
    }

    /// Query the neighborhood covering `radius` around `(x, y)`.
    ///
    /// Allocating convenience over [`SpatialGrid::visit_nearby`].
    pub fn nearby(&self, x: f64, y: f64, radius: f64) -> impl Iterator<Item = usize> + '_ {
        let mut out = Vec::new();
        self.visit_nearby(x, y, radius, |s| out.push(s));
        out.into_iter()
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}
