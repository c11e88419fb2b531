use serde::{Deserialize, Serialize};
use std::path::Path;

use super::model::{Category, MenuPatch, Role};

/// One entry of the canonical menu table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultItem {
    pub menu_id: String,
    #[serde(flatten)]
    pub fields: MenuPatch,
    /// Overwrite the stored definition even when the item already exists.
    /// Reserved for correcting a specific known-bad entry.
    #[serde(default)]
    pub force_update: bool,
}

impl DefaultItem {
    fn new(menu_id: &str, label: &str, path: &str, category: Category, order: i32, role: Role) -> Self {
        Self {
            menu_id: menu_id.to_string(),
            fields: MenuPatch::definition(label, path, category, order, role),
            force_update: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DefaultsFile {
    items: Vec<DefaultItem>,
}

/// The navigation shipped with E-Unify.
pub fn default_menu() -> Vec<DefaultItem> {
    use Category::*;
    use Role::*;

    vec![
        DefaultItem::new("dashboard", "Dashboard", "/dashboard", Primary, 1, User),
        DefaultItem::new("data-catalog", "Data Catalog", "/data-catalog", Primary, 10, User),
        DefaultItem::new("data-assets", "Data Assets", "/data-assets", Primary, 20, User),
        DefaultItem::new("kpis", "KPIs", "/kpis", Primary, 30, User),
        DefaultItem::new("business-glossary", "Business Glossary", "/glossary", Primary, 40, User),
        DefaultItem::new("data-lineage", "Data Lineage", "/lineage", Primary, 50, User),
        DefaultItem::new("data-quality", "Data Quality", "/data-quality", Secondary, 10, DataSteward),
        DefaultItem::new("stewardship-queue", "Stewardship Queue", "/stewardship", Secondary, 20, DataSteward),
        DefaultItem::new("policies", "Policies", "/policies", Secondary, 30, DataSteward),
        DefaultItem::new("reports", "Reports", "/reports", Secondary, 40, User),
        DefaultItem::new("settings", "Settings", "/settings", Secondary, 90, User),
        DefaultItem::new("user-management", "User Management", "/admin/users", Administration, 70, Admin),
        DefaultItem::new("menu-settings", "Menu Settings", "/admin/menu", Administration, 80, Admin),
        DefaultItem::new("team-roster", "Team Roster", "/admin/team", Administration, 85, Admin),
        DefaultItem::new("audit-log", "Audit Log", "/admin/audit", Administration, 90, Admin),
    ]
}

/// Load an alternative table from YAML:
///
/// ```yaml
/// items:
///   - menuId: dashboard
///     label: Dashboard
///     path: /dashboard
///     order: 1
/// ```
pub fn load_defaults(path: &Path) -> anyhow::Result<Vec<DefaultItem>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read defaults file {}: {}", path.display(), e))?;
    let file: DefaultsFile = serde_yaml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse defaults file {}: {}", path.display(), e))?;
    Ok(file.items)
}
