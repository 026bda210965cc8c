// Layout model - grid items, breakpoint tiers and the persisted configuration
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::catalog::WidgetCatalog;
use super::geometry::GridRect;

/// One widget's placement inside a single breakpoint's layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridItem {
    pub widget_id: String,
    #[serde(flatten)]
    pub rect: GridRect,
}

impl GridItem {
    pub fn new(widget_id: impl Into<String>, rect: GridRect) -> Self {
        Self {
            widget_id: widget_id.into(),
            rect,
        }
    }
}

/// A named viewport tier with its own column count. The tier table is fixed
/// for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub name: String,
    pub min_width: u32,
    pub columns: i32,
}

impl Breakpoint {
    pub fn new(name: &str, min_width: u32, columns: i32) -> Self {
        Self {
            name: name.to_string(),
            min_width,
            columns,
        }
    }
}

/// The unit of persistence: which widgets are active, and where each one sits
/// in every breakpoint's grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfiguration {
    pub active_widget_ids: BTreeSet<String>,
    pub layouts: BTreeMap<String, Vec<GridItem>>,
}

impl DashboardConfiguration {
    /// Deterministic arrangement for `widget_ids`, one independently packed
    /// layout per breakpoint. Ids unknown to the catalog are skipped.
    pub fn generate(
        catalog: &WidgetCatalog,
        widget_ids: &[&str],
        breakpoints: &[Breakpoint],
    ) -> Self {
        let active_widget_ids = widget_ids
            .iter()
            .filter(|id| catalog.contains(id))
            .map(|id| id.to_string())
            .collect();
        let layouts = breakpoints
            .iter()
            .map(|bp| {
                (
                    bp.name.clone(),
                    generate_layout(catalog, widget_ids, bp.columns),
                )
            })
            .collect();
        Self {
            active_widget_ids,
            layouts,
        }
    }
}

/// Shelf packing: walk the ids in order with a `(x, y)` cursor and a running
/// row height, wrapping to a fresh row whenever the next widget's default
/// width no longer fits. The cursor only moves forward, so the result cannot
/// contain overlaps.
pub fn generate_layout(
    catalog: &WidgetCatalog,
    widget_ids: &[&str],
    columns: i32,
) -> Vec<GridItem> {
    let mut items = Vec::with_capacity(widget_ids.len());
    let mut x = 0;
    let mut y = 0;
    let mut row_height = 0;
    for id in widget_ids {
        let Some(def) = catalog.get(id) else {
            tracing::debug!(widget_id = %id, "skipping unknown widget in generated layout");
            continue;
        };
        let w = def.default_size.w.clamp(1, columns);
        let h = def.default_size.h.max(1);
        if x + w > columns {
            x = 0;
            y += row_height;
            row_height = 0;
        }
        items.push(GridItem::new(def.id.clone(), GridRect::new(x, y, w, h)));
        x += w;
        row_height = row_height.max(h);
    }
    items
}
