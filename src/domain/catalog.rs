// Widget catalog - static registry of every report widget the dashboard can show
use serde::Serialize;

use super::geometry::GridSize;

/// Widget ids placed on a freshly provisioned dashboard, in placement order.
pub const DEFAULT_WIDGETS: &[&str] = &[
    "occupancy_rate",
    "arrivals_today",
    "open_work_orders",
    "meals_served_today",
    "occupancy_trend",
    "maintenance_backlog",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Kpi,
    Chart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetCategory {
    Occupancy,
    Maintenance,
    FoodService,
    Communications,
}

#[derive(Debug, Clone, Serialize)]
pub struct WidgetDefinition {
    pub id: String,
    pub kind: WidgetKind,
    pub label: String,
    pub category: WidgetCategory,
    pub default_size: GridSize,
    pub min_size: GridSize,
}

impl WidgetDefinition {
    fn new(
        id: &str,
        kind: WidgetKind,
        label: &str,
        category: WidgetCategory,
        default_size: GridSize,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: label.to_string(),
            category,
            default_size,
            min_size: default_size,
        }
    }

    fn with_min_size(mut self, min_size: GridSize) -> Self {
        self.min_size = min_size;
        self
    }
}

/// Compiled-in registry; definitions are never created or destroyed at runtime.
#[derive(Debug, Clone)]
pub struct WidgetCatalog {
    widgets: Vec<WidgetDefinition>,
}

impl WidgetCatalog {
    pub fn builtin() -> Self {
        use WidgetCategory::*;
        use WidgetKind::*;

        let kpi = GridSize::new(3, 2);
        let kpi_min = GridSize::new(2, 2);
        let chart = GridSize::new(6, 4);
        let chart_min = GridSize::new(4, 3);

        Self {
            widgets: vec![
                WidgetDefinition::new("occupancy_rate", Kpi, "Occupancy rate", Occupancy, kpi)
                    .with_min_size(kpi_min),
                WidgetDefinition::new("arrivals_today", Kpi, "Arrivals today", Occupancy, kpi)
                    .with_min_size(kpi_min),
                WidgetDefinition::new("departures_today", Kpi, "Departures today", Occupancy, kpi)
                    .with_min_size(kpi_min),
                WidgetDefinition::new(
                    "open_work_orders",
                    Kpi,
                    "Open work orders",
                    Maintenance,
                    kpi,
                )
                .with_min_size(kpi_min),
                WidgetDefinition::new(
                    "meals_served_today",
                    Kpi,
                    "Meals served today",
                    FoodService,
                    kpi,
                )
                .with_min_size(kpi_min),
                WidgetDefinition::new(
                    "unread_messages",
                    Kpi,
                    "Unread messages",
                    Communications,
                    kpi,
                )
                .with_min_size(kpi_min),
                WidgetDefinition::new(
                    "occupancy_trend",
                    Chart,
                    "Occupancy trend",
                    Occupancy,
                    GridSize::new(6, 5),
                )
                .with_min_size(GridSize::new(4, 4)),
                WidgetDefinition::new(
                    "checkin_volume",
                    Chart,
                    "Check-in volume",
                    Occupancy,
                    chart,
                )
                .with_min_size(chart_min),
                WidgetDefinition::new(
                    "maintenance_backlog",
                    Chart,
                    "Maintenance backlog",
                    Maintenance,
                    chart,
                )
                .with_min_size(chart_min),
                WidgetDefinition::new("meal_counts", Chart, "Meal counts", FoodService, chart)
                    .with_min_size(chart_min),
                WidgetDefinition::new(
                    "message_traffic",
                    Chart,
                    "Message traffic",
                    Communications,
                    chart,
                )
                .with_min_size(chart_min),
            ],
        }
    }

    /// Unknown ids resolve to `None`; callers treat that as a no-op trigger.
    pub fn get(&self, id: &str) -> Option<&WidgetDefinition> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn all(&self) -> &[WidgetDefinition] {
        &self.widgets
    }

    /// Definitions of one category, in registration order.
    pub fn list_by_category(&self, category: WidgetCategory) -> Vec<&WidgetDefinition> {
        self.widgets
            .iter()
            .filter(|w| w.category == category)
            .collect()
    }
}
