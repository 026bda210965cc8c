// Grid geometry - rectangle arithmetic behind every layout mutation
use serde::{Deserialize, Serialize};

use super::layout::GridItem;

/// Width/height of a widget in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub w: i32,
    pub h: i32,
}

impl GridSize {
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// A placed rectangle, top-left cell plus extent, zero-based grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl GridRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// True iff the two rectangles share at least one grid cell.
pub fn overlaps(a: &GridRect, b: &GridRect) -> bool {
    a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h
}

/// Fit a rectangle inside `[0, columns)`: a rectangle wider than the grid is
/// shrunk to full width, then shifted so both edges are in bounds. `y` floors
/// at zero and extents floor at one cell.
pub fn clamp_to_columns(rect: GridRect, columns: i32) -> GridRect {
    let w = rect.w.clamp(1, columns);
    let h = rect.h.max(1);
    let x = rect.x.clamp(0, columns - w);
    let y = rect.y.max(0);
    GridRect { x, y, w, h }
}

/// Gravity packing: items are processed in ascending `(y, x)` order (stable
/// for ties) and each settles at the lowest `y` where it overlaps nothing
/// already placed. Widths, heights and `x` are untouched and the returned
/// collection keeps the input order. Idempotent.
pub fn compact(items: &[GridItem], columns: i32) -> Vec<GridItem> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| (items[i].rect.y, items[i].rect.x));

    let mut result = items.to_vec();
    let mut placed: Vec<GridRect> = Vec::with_capacity(items.len());
    for &i in &order {
        let mut rect = clamp_to_columns(items[i].rect, columns);
        rect.y = 0;
        while placed.iter().any(|p| overlaps(p, &rect)) {
            rect.y += 1;
        }
        placed.push(rect);
        result[i].rect = rect;
    }
    result
}

/// Replace the entry matching `moved.widget_id`, push every item that now
/// overlaps it down to just below the item it collided with (cascading until
/// the set settles), then compact. An id with no matching entry leaves the
/// input compacted but otherwise untouched.
pub fn resolve_collision(items: &[GridItem], moved: GridItem, columns: i32) -> Vec<GridItem> {
    let mut result = items.to_vec();
    let Some(moved_idx) = result.iter().position(|i| i.widget_id == moved.widget_id) else {
        return compact(&result, columns);
    };
    result[moved_idx] = moved;

    let mut pending = vec![moved_idx];
    while let Some(settled_idx) = pending.pop() {
        let settled = result[settled_idx].rect;
        for j in 0..result.len() {
            // The user's own placement is never displaced by the cascade.
            if j == settled_idx || j == moved_idx {
                continue;
            }
            if overlaps(&result[j].rect, &settled) {
                result[j].rect.y = settled.y + settled.h;
                pending.push(j);
            }
        }
    }
    compact(&result, columns)
}

/// Scan `(y, x)` ascending for the first placement of `size` that overlaps
/// no existing item. Terminates because every row below the occupied region
/// is free.
pub fn first_free_slot(items: &[GridItem], size: GridSize, columns: i32) -> GridRect {
    let w = size.w.clamp(1, columns);
    let h = size.h.max(1);
    let mut y = 0;
    loop {
        for x in 0..=(columns - w) {
            let candidate = GridRect { x, y, w, h };
            if !items.iter().any(|i| overlaps(&i.rect, &candidate)) {
                return candidate;
            }
        }
        y += 1;
    }
}
