use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::menu::{Category, MenuError, MenuItem, Role};

/// Row shape of the `menu_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct MenuItemRow {
    pub menu_id: String,
    pub label: String,
    pub path: String,
    pub category: String,
    pub sort_order: i32,
    pub required_role: String,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = MenuError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<Category>()
            .map_err(|e: String| MenuError::Internal(format!("menu item '{}': {}", row.menu_id, e)))?;
        let required_role = row
            .required_role
            .parse::<Role>()
            .map_err(|e: String| MenuError::Internal(format!("menu item '{}': {}", row.menu_id, e)))?;

        Ok(MenuItem {
            menu_id: row.menu_id,
            label: row.label,
            path: row.path,
            category,
            order: row.sort_order,
            required_role,
            is_enabled: row.is_enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, role: &str) -> MenuItemRow {
        let now = Utc::now();
        MenuItemRow {
            menu_id: "data-quality".to_string(),
            label: "Data Quality".to_string(),
            path: "/data-quality".to_string(),
            category: category.to_string(),
            sort_order: 10,
            required_role: role.to_string(),
            is_enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn converts_known_values() {
        let item = MenuItem::try_from(row("secondary", "data-steward")).unwrap();
        assert_eq!(item.category, Category::Secondary);
        assert_eq!(item.required_role, Role::DataSteward);
        assert_eq!(item.order, 10);
    }

    #[test]
    fn rejects_unknown_role() {
        let err = MenuItem::try_from(row("secondary", "superuser")).unwrap_err();
        assert!(err.to_string().contains("superuser"));
    }
}
