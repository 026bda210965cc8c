// Layout store - in-memory dashboard configuration and its mutation operations
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::catalog::WidgetCatalog;
use crate::domain::geometry::{self, GridRect};
use crate::domain::layout::{Breakpoint, DashboardConfiguration, GridItem, generate_layout};

/// Owns one `DashboardConfiguration` and funnels every mutation through the
/// grid geometry so the layout invariants hold after each operation. Invalid
/// input is a logged no-op; nothing here can fail an editing session.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    catalog: WidgetCatalog,
    breakpoints: Vec<Breakpoint>,
    config: DashboardConfiguration,
}

impl LayoutStore {
    pub fn new(
        catalog: WidgetCatalog,
        breakpoints: Vec<Breakpoint>,
        config: DashboardConfiguration,
    ) -> Self {
        Self {
            catalog,
            breakpoints,
            config,
        }
    }

    /// Deterministic arrangement of `widget_ids` across all tiers.
    pub fn generated(
        catalog: WidgetCatalog,
        breakpoints: Vec<Breakpoint>,
        widget_ids: &[&str],
    ) -> Self {
        let config = DashboardConfiguration::generate(&catalog, widget_ids, &breakpoints);
        Self::new(catalog, breakpoints, config)
    }

    /// Rebuild a store from a persisted configuration, repairing whatever the
    /// blob got wrong: ids retired from the catalog are dropped (together
    /// with their items), orphan and duplicate items are removed, every rect
    /// is clamped to the tier and the widget's minimum size, active widgets
    /// missing from a tier get a scanned free slot, and a tier is compacted
    /// only if overlaps survived all that.
    pub fn hydrated(
        catalog: WidgetCatalog,
        breakpoints: Vec<Breakpoint>,
        stored: DashboardConfiguration,
    ) -> Self {
        let active: BTreeSet<String> = stored
            .active_widget_ids
            .into_iter()
            .filter(|id| {
                let known = catalog.contains(id);
                if !known {
                    tracing::warn!(widget_id = %id, "dropping stored widget missing from catalog");
                }
                known
            })
            .collect();

        let mut layouts = BTreeMap::new();
        for bp in &breakpoints {
            let mut items: Vec<GridItem> = stored
                .layouts
                .get(&bp.name)
                .cloned()
                .unwrap_or_default();

            let mut seen = BTreeSet::new();
            items.retain(|item| {
                active.contains(&item.widget_id) && seen.insert(item.widget_id.clone())
            });

            for item in items.iter_mut() {
                if let Some(def) = catalog.get(&item.widget_id) {
                    item.rect.w = item.rect.w.max(def.min_size.w);
                    item.rect.h = item.rect.h.max(def.min_size.h);
                }
                item.rect = geometry::clamp_to_columns(item.rect, bp.columns);
            }

            for id in &active {
                if items.iter().any(|i| &i.widget_id == id) {
                    continue;
                }
                if let Some(def) = catalog.get(id) {
                    let rect = geometry::first_free_slot(&items, def.default_size, bp.columns);
                    items.push(GridItem::new(id.clone(), rect));
                }
            }

            let overlapping = items.iter().enumerate().any(|(i, a)| {
                items[i + 1..]
                    .iter()
                    .any(|b| geometry::overlaps(&a.rect, &b.rect))
            });
            if overlapping {
                items = geometry::compact(&items, bp.columns);
            }

            layouts.insert(bp.name.clone(), items);
        }

        Self::new(
            catalog,
            breakpoints,
            DashboardConfiguration {
                active_widget_ids: active,
                layouts,
            },
        )
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn configuration(&self) -> &DashboardConfiguration {
        &self.config
    }

    /// Immutable copy for persistence.
    pub fn snapshot(&self) -> DashboardConfiguration {
        self.config.clone()
    }

    /// Replace the held configuration wholesale (cancel / reset paths).
    pub fn replace(&mut self, config: DashboardConfiguration) {
        self.config = config;
    }

    /// Place a catalog widget into every tier at the first free slot for its
    /// default size. Already-active and unknown ids are no-ops.
    pub fn add_widget(&mut self, widget_id: &str) {
        let Some(def) = self.catalog.get(widget_id) else {
            tracing::debug!(widget_id, "ignoring add of unknown widget");
            return;
        };
        if self.config.active_widget_ids.contains(widget_id) {
            tracing::debug!(widget_id, "ignoring add of already active widget");
            return;
        }
        let default_size = def.default_size;
        for bp in &self.breakpoints {
            let items = self.config.layouts.entry(bp.name.clone()).or_default();
            let rect = geometry::first_free_slot(items, default_size, bp.columns);
            items.push(GridItem::new(widget_id, rect));
        }
        self.config.active_widget_ids.insert(widget_id.to_string());
    }

    /// Drop a widget from the active set and from every tier. The remaining
    /// items keep their positions; the gap the widget leaves is intentional.
    pub fn remove_widget(&mut self, widget_id: &str) {
        if !self.config.active_widget_ids.remove(widget_id) {
            tracing::debug!(widget_id, "ignoring remove of inactive widget");
            return;
        }
        for items in self.config.layouts.values_mut() {
            items.retain(|i| i.widget_id != widget_id);
        }
    }

    /// Apply a move/resize reported by the pointer-input source to one tier.
    /// The rectangle is clamped to the widget's minimum size and the tier's
    /// columns, then collisions are resolved for that tier alone.
    pub fn move_or_resize(&mut self, breakpoint: &str, widget_id: &str, requested: GridRect) {
        let Some(def) = self.catalog.get(widget_id) else {
            tracing::debug!(widget_id, "ignoring move of unknown widget");
            return;
        };
        if !self.config.active_widget_ids.contains(widget_id) {
            tracing::debug!(widget_id, "ignoring move of inactive widget");
            return;
        }
        let Some(bp) = self.breakpoints.iter().find(|b| b.name == breakpoint) else {
            tracing::debug!(breakpoint, "ignoring move for unknown breakpoint");
            return;
        };

        let mut rect = requested;
        rect.w = rect.w.max(def.min_size.w);
        rect.h = rect.h.max(def.min_size.h);
        let rect = geometry::clamp_to_columns(rect, bp.columns);

        let items = self.config.layouts.entry(bp.name.clone()).or_default();
        let resolved =
            geometry::resolve_collision(items, GridItem::new(widget_id, rect), bp.columns);
        *items = resolved;
    }

    /// Regenerate every tier except the widest from the widest tier's
    /// reading order. Backs the `derive` narrow-layout policy.
    pub fn derive_narrow_layouts(&mut self) {
        let Some(widest) = self.breakpoints.iter().max_by_key(|b| b.min_width) else {
            return;
        };
        let Some(reference) = self.config.layouts.get(&widest.name) else {
            return;
        };
        let mut ordered: Vec<(GridRect, String)> = reference
            .iter()
            .map(|i| (i.rect, i.widget_id.clone()))
            .collect();
        ordered.sort_by_key(|(rect, _)| (rect.y, rect.x));
        let ids: Vec<String> = ordered.into_iter().map(|(_, id)| id).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        let widest_name = widest.name.clone();
        let narrow: Vec<(String, i32)> = self
            .breakpoints
            .iter()
            .filter(|b| b.name != widest_name)
            .map(|b| (b.name.clone(), b.columns))
            .collect();
        for (name, columns) in narrow {
            let layout = generate_layout(&self.catalog, &id_refs, columns);
            self.config.layouts.insert(name, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::overlaps;
    use proptest::prelude::*;

    fn breakpoints() -> Vec<Breakpoint> {
        vec![
            Breakpoint::new("lg", 1200, 12),
            Breakpoint::new("sm", 768, 6),
        ]
    }

    fn default_store() -> LayoutStore {
        LayoutStore::generated(
            WidgetCatalog::builtin(),
            breakpoints(),
            &["occupancy_rate", "occupancy_trend"],
        )
    }

    fn assert_invariants(store: &LayoutStore) {
        let config = store.configuration();
        for bp in store.breakpoints() {
            let items = config
                .layouts
                .get(&bp.name)
                .unwrap_or_else(|| panic!("missing layout for {}", bp.name));
            let ids: Vec<&str> = items.iter().map(|i| i.widget_id.as_str()).collect();
            // Membership matches the active set exactly, in every tier.
            assert_eq!(ids.len(), config.active_widget_ids.len(), "{}", bp.name);
            for id in &config.active_widget_ids {
                assert!(ids.contains(&id.as_str()), "{id} absent from {}", bp.name);
            }
            for item in items {
                let def = store.catalog().get(&item.widget_id).expect("active id known");
                assert!(item.rect.w >= def.min_size.w.min(bp.columns));
                assert!(item.rect.h >= def.min_size.h);
                assert!(item.rect.x >= 0 && item.rect.y >= 0);
                assert!(item.rect.x + item.rect.w <= bp.columns);
            }
            for (i, a) in items.iter().enumerate() {
                for b in &items[i + 1..] {
                    assert!(!overlaps(&a.rect, &b.rect), "overlap in {}", bp.name);
                }
            }
        }
    }

    #[test]
    fn test_add_unknown_or_duplicate_is_a_noop() {
        let mut store = default_store();
        let before = store.snapshot();
        store.add_widget("retired_widget");
        store.add_widget("occupancy_rate");
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_add_places_widget_in_every_tier() {
        let mut store = default_store();
        store.add_widget("unread_messages");
        assert!(store.configuration().active_widget_ids.contains("unread_messages"));
        for bp in breakpoints() {
            assert!(
                store.configuration().layouts[&bp.name]
                    .iter()
                    .any(|i| i.widget_id == "unread_messages")
            );
        }
        assert_invariants(&store);
    }

    #[test]
    fn test_remove_keeps_other_placements_untouched() {
        let mut store = default_store();
        let kpi_before = store.configuration().layouts["lg"]
            .iter()
            .find(|i| i.widget_id == "occupancy_rate")
            .cloned()
            .expect("kpi placed");
        store.remove_widget("occupancy_trend");

        let config = store.configuration();
        assert!(!config.active_widget_ids.contains("occupancy_trend"));
        for bp in breakpoints() {
            assert!(
                !config.layouts[&bp.name]
                    .iter()
                    .any(|i| i.widget_id == "occupancy_trend")
            );
        }
        assert_eq!(
            config.layouts["lg"]
                .iter()
                .find(|i| i.widget_id == "occupancy_rate"),
            Some(&kpi_before)
        );
    }

    #[test]
    fn test_add_then_remove_restores_the_configuration() {
        let mut store = default_store();
        let before = store.snapshot();
        store.add_widget("meal_counts");
        store.remove_widget("meal_counts");
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_resize_below_minimum_clamps_to_minimum() {
        let mut store = default_store();
        // occupancy_rate has min 2x2; 1x1 is raised, not rejected.
        store.move_or_resize("lg", "occupancy_rate", GridRect::new(0, 0, 1, 1));
        let rect = store.configuration().layouts["lg"]
            .iter()
            .find(|i| i.widget_id == "occupancy_rate")
            .map(|i| i.rect)
            .expect("kpi placed");
        assert_eq!((rect.w, rect.h), (2, 2));
        assert_invariants(&store);
    }

    #[test]
    fn test_move_touches_only_the_named_tier() {
        let mut store = default_store();
        let sm_before = store.configuration().layouts["sm"].clone();
        store.move_or_resize("lg", "occupancy_rate", GridRect::new(9, 0, 3, 2));
        assert_eq!(store.configuration().layouts["sm"], sm_before);
        assert_invariants(&store);
    }

    #[test]
    fn test_move_with_unknown_breakpoint_is_a_noop() {
        let mut store = default_store();
        let before = store.snapshot();
        store.move_or_resize("xl", "occupancy_rate", GridRect::new(0, 0, 3, 2));
        store.move_or_resize("lg", "retired_widget", GridRect::new(0, 0, 3, 2));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_hydrated_drops_retired_widgets() {
        let mut stored = default_store().snapshot();
        stored.active_widget_ids.insert("retired_widget".to_string());
        stored
            .layouts
            .get_mut("lg")
            .expect("lg layout")
            .push(GridItem::new("retired_widget", GridRect::new(0, 20, 3, 2)));

        let store = LayoutStore::hydrated(WidgetCatalog::builtin(), breakpoints(), stored);
        let config = store.configuration();
        assert!(!config.active_widget_ids.contains("retired_widget"));
        for items in config.layouts.values() {
            assert!(!items.iter().any(|i| i.widget_id == "retired_widget"));
        }
        assert_invariants(&store);
    }

    #[test]
    fn test_hydrated_places_widgets_missing_from_a_tier() {
        let mut stored = default_store().snapshot();
        stored
            .layouts
            .get_mut("sm")
            .expect("sm layout")
            .retain(|i| i.widget_id != "occupancy_trend");

        let store = LayoutStore::hydrated(WidgetCatalog::builtin(), breakpoints(), stored);
        assert_invariants(&store);
    }

    #[test]
    fn test_hydrated_repairs_overlapping_blob() {
        let mut stored = default_store().snapshot();
        for item in stored.layouts.get_mut("lg").expect("lg layout") {
            item.rect.x = 0;
            item.rect.y = 0;
        }
        let store = LayoutStore::hydrated(WidgetCatalog::builtin(), breakpoints(), stored);
        assert_invariants(&store);
    }

    #[test]
    fn test_derive_rebuilds_narrow_tiers_from_widest_order() {
        let mut store = default_store();
        // Put the chart above the KPI on the wide tier, then derive.
        store.move_or_resize("lg", "occupancy_trend", GridRect::new(0, 0, 6, 5));
        store.derive_narrow_layouts();
        let sm = &store.configuration().layouts["sm"];
        assert_eq!(sm[0].widget_id, "occupancy_trend");
        assert_eq!(sm[0].rect, GridRect::new(0, 0, 6, 5));
        assert_eq!(sm[1].widget_id, "occupancy_rate");
        assert_eq!(sm[1].rect, GridRect::new(0, 5, 3, 2));
        assert_invariants(&store);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Remove(usize),
        Move(usize, usize, GridRect),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..16usize).prop_map(Op::Add),
            (0..16usize).prop_map(Op::Remove),
            (0..16usize, 0..2usize, -2..14i32, -2..30i32, 0..8i32, 0..8i32)
                .prop_map(|(w, b, x, y, rw, rh)| Op::Move(w, b, GridRect::new(x, y, rw, rh))),
        ]
    }

    proptest! {
        // Invariants 1-5 hold after any sequence of store operations,
        // including ones aimed at unknown widgets and malformed rectangles.
        #[test]
        fn prop_mutations_preserve_invariants(ops in prop::collection::vec(arb_op(), 0..40)) {
            let catalog = WidgetCatalog::builtin();
            let mut ids: Vec<String> =
                catalog.all().iter().map(|w| w.id.clone()).collect();
            ids.push("retired_widget".to_string());
            let tiers = breakpoints();
            let mut store = default_store();

            for op in ops {
                match op {
                    Op::Add(w) => store.add_widget(&ids[w % ids.len()]),
                    Op::Remove(w) => store.remove_widget(&ids[w % ids.len()]),
                    Op::Move(w, b, rect) => {
                        let bp = tiers[b % tiers.len()].name.clone();
                        store.move_or_resize(&bp, &ids[w % ids.len()], rect);
                    }
                }
                assert_invariants(&store);
            }
        }
    }
}
