// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-site lookup over the visible node centers.
//!
//! Finding the Voronoi cell that contains a point is the same as finding the
//! nearest site. Sites are bucketed into a uniform grid over the disk's
//! bounding square and queries scan rings of cells outward from the query
//! cell, stopping once no unvisited cell can hold a closer site.

use core::fmt::Debug;

use hashbrown::HashMap;
use hypertree_math::Complex;
use hypertree_tree::NodeId;
use smallvec::SmallVec;

/// Side length of the square the grid covers, centered on the origin.
const EXTENT: f64 = 2.0;

/// Nearest-site index over disk points.
#[derive(Clone, Default)]
pub struct Tessellation {
    cell_size: f64,
    sites: Vec<(NodeId, Complex)>,
    cells: HashMap<(i32, i32), SmallVec<[usize; 8]>>,
    min_cell: (i32, i32),
    max_cell: (i32, i32),
}

impl Debug for Tessellation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tessellation")
            .field("cell_size", &self.cell_size)
            .field("sites", &self.sites.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl Tessellation {
    /// Build the index. Non-finite sites are skipped.
    pub fn build(sites: impl IntoIterator<Item = (NodeId, Complex)>) -> Self {
        let sites: Vec<_> = sites.into_iter().filter(|(_, z)| z.is_finite()).collect();
        #[allow(clippy::cast_precision_loss, reason = "site counts are small")]
        let per_axis = (sites.len() as f64).sqrt().max(1.0);
        let cell_size = EXTENT / per_axis;

        let mut tess = Self {
            cell_size,
            sites: Vec::new(),
            cells: HashMap::new(),
            min_cell: (i32::MAX, i32::MAX),
            max_cell: (i32::MIN, i32::MIN),
        };
        for (slot, &(_, z)) in sites.iter().enumerate() {
            let cell = tess.cell_of(z);
            tess.min_cell = (tess.min_cell.0.min(cell.0), tess.min_cell.1.min(cell.1));
            tess.max_cell = (tess.max_cell.0.max(cell.0), tess.max_cell.1.max(cell.1));
            tess.cells.entry(cell).or_default().push(slot);
        }
        tess.sites = sites;
        tess
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether there are no sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The indexed sites, in insertion order.
    pub fn sites(&self) -> &[(NodeId, Complex)] {
        &self.sites
    }

    /// The node whose cell contains `point`, if within `max_radius` of it.
    ///
    /// Fewer than two sites never match: a single site has no meaningful
    /// cell boundary.
    pub fn find(&self, point: Complex, max_radius: f64) -> Option<NodeId> {
        if self.sites.len() < 2 || !point.is_finite() {
            return None;
        }
        let (cx, cy) = self.cell_of(point);
        let reach = [
            cx - self.min_cell.0,
            self.max_cell.0 - cx,
            cy - self.min_cell.1,
            self.max_cell.1 - cy,
        ]
        .into_iter()
        .map(i32::unsigned_abs)
        .max()
        .unwrap_or(0);

        let mut best: Option<(usize, f64)> = None;
        for ring in 0..=reach {
            #[allow(clippy::cast_possible_wrap, reason = "ring is bounded by grid coordinates")]
            let k = ring as i32;
            for cell in ring_cells(cx, cy, k) {
                let Some(slots) = self.cells.get(&cell) else {
                    continue;
                };
                for &slot in slots {
                    let d = self.sites[slot].1.distance(point);
                    if best.is_none_or(|(_, bd)| d < bd) {
                        best = Some((slot, d));
                    }
                }
            }
            // Every cell in ring k + 1 is at least k cells away.
            if let Some((_, bd)) = best
                && bd <= f64::from(k) * self.cell_size
            {
                break;
            }
        }
        best.filter(|&(_, d)| d <= max_radius)
            .map(|(slot, _)| self.sites[slot].0)
    }

    fn cell_of(&self, z: Complex) -> (i32, i32) {
        (
            cell_coord(z.re, self.cell_size),
            cell_coord(z.im, self.cell_size),
        )
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
)]
fn cell_coord(value: f64, cell_size: f64) -> i32 {
    ((value + EXTENT / 2.0) / cell_size).floor() as i32
}

/// Cells at Chebyshev distance exactly `k` from `(cx, cy)`.
fn ring_cells(cx: i32, cy: i32, k: i32) -> impl Iterator<Item = (i32, i32)> {
    let (top, bottom) = (cy - k, cy + k);
    // Ring 0 is a single cell; its top and bottom rows coincide.
    let rows = if k == 0 { 1 } else { 2 };
    let horizontal = (-k..=k).flat_map(move |dx| {
        [(cx + dx, top), (cx + dx, bottom)].into_iter().take(rows)
    });
    let vertical = (-k + 1..k).flat_map(move |dy| [(cx - k, cy + dy), (cx + k, cy + dy)]);
    horizontal.chain(vertical)
}
