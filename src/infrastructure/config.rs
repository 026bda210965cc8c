use serde::Deserialize;

use crate::domain::layout::Breakpoint;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub server: ServerSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
    pub storage_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default)]
    pub narrow_layout_policy: NarrowLayoutPolicy,
    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            narrow_layout_policy: NarrowLayoutPolicy::default(),
            breakpoints: default_breakpoints(),
        }
    }
}

/// What happens to the narrower tiers on save: keep each tier's stored
/// arrangement as edited, or rebuild them from the widest tier's order.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NarrowLayoutPolicy {
    #[default]
    Independent,
    Derive,
}

/// The five standard viewport tiers.
pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new("lg", 1200, 12),
        Breakpoint::new("md", 996, 10),
        Breakpoint::new("sm", 768, 6),
        Breakpoint::new("xs", 480, 4),
        Breakpoint::new("xxs", 0, 2),
    ]
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
