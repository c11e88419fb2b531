use serde::Serialize;
use std::sync::Arc;

use super::error::MenuResult;
use super::model::{Category, MenuItem, Role};
use super::store::{MenuFilter, MenuStore};

/// Navigation entry as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub menu_id: String,
    pub label: String,
    pub path: String,
    pub order: i32,
}

impl From<MenuItem> for MenuEntry {
    fn from(item: MenuItem) -> Self {
        Self {
            menu_id: item.menu_id,
            label: item.label,
            path: item.path,
            order: item.order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub category: Category,
    pub items: Vec<MenuEntry>,
}

/// Read path. Never mutates the store.
#[derive(Clone)]
pub struct MenuQueryService {
    store: Arc<dyn MenuStore>,
}

impl MenuQueryService {
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        Self { store }
    }

    /// Enabled items the caller's role satisfies, grouped by category in
    /// render order. Within a section items are sorted by order, then id.
    pub async fn visible_items(&self, role: Role) -> MenuResult<Vec<MenuSection>> {
        let items = self.store.find_all(MenuFilter::enabled()).await?;
        Ok(group_visible(items, role))
    }

    /// Every stored item, enabled or not.
    pub async fn all_items(&self) -> MenuResult<Vec<MenuItem>> {
        self.store.find_all(MenuFilter::all()).await
    }
}

fn group_visible(mut items: Vec<MenuItem>, role: Role) -> Vec<MenuSection> {
    items.retain(|item| item.is_enabled && role.satisfies(item.required_role));
    items.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut sections: Vec<MenuSection> = Vec::new();
    for item in items {
        match sections.last_mut() {
            Some(section) if section.category == item.category => section.items.push(item.into()),
            _ => sections.push(MenuSection {
                category: item.category,
                items: vec![item.into()],
            }),
        }
    }
    sections
}
