use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::error::{MenuError, MenuResult, ValidationError, Violation};
use super::model::{MenuItem, MenuPatch};
use super::store::{MenuStore, UpsertOutcome};

/// Operator-driven writes. Callers are expected to have checked that the
/// requester holds the admin role.
#[derive(Clone)]
pub struct MenuAdminService {
    store: Arc<dyn MenuStore>,
}

impl MenuAdminService {
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, menu_id: &str) -> MenuResult<MenuItem> {
        self.store
            .find_one(menu_id)
            .await?
            .ok_or_else(|| MenuError::NotFound(menu_id.to_string()))
    }

    pub async fn set_enabled(&self, menu_id: &str, enabled: bool) -> MenuResult<MenuItem> {
        let item = self.patch_existing(menu_id, MenuPatch::enabled(enabled)).await?;
        info!("Menu item {} {}", menu_id, if enabled { "enabled" } else { "disabled" });
        Ok(item)
    }

    /// Move an item within its category. Siblings are not renumbered.
    pub async fn reorder(&self, menu_id: &str, new_order: i32) -> MenuResult<MenuItem> {
        if new_order < 0 {
            return Err(ValidationError::new(vec![Violation::new(
                "order",
                format!("must be non-negative, got {}", new_order),
            )])
            .into());
        }
        let item = self.patch_existing(menu_id, MenuPatch::order(new_order)).await?;
        info!("Menu item {} moved to order {}", menu_id, new_order);
        Ok(item)
    }

    /// Edit or create a definition. Fields left out of `fields` keep their
    /// stored value.
    pub async fn upsert_definition(&self, menu_id: &str, fields: MenuPatch) -> MenuResult<UpsertOutcome> {
        let outcome = self.store.upsert(menu_id, fields).await?;
        match &outcome {
            UpsertOutcome::Created(_) => info!("Menu item {} created", menu_id),
            UpsertOutcome::Updated(_) => info!("Menu item {} updated", menu_id),
            UpsertOutcome::Unchanged(_) => {}
        }
        Ok(outcome)
    }

    /// Insert that refuses to touch an existing id.
    pub async fn create(&self, menu_id: &str, fields: MenuPatch) -> MenuResult<MenuItem> {
        let item = fields.into_item(menu_id, Utc::now())?;
        let item = self.store.insert(item).await?;
        info!("Menu item {} created", menu_id);
        Ok(item)
    }

    pub async fn remove(&self, menu_id: &str) -> MenuResult<()> {
        if !self.store.remove(menu_id).await? {
            return Err(MenuError::NotFound(menu_id.to_string()));
        }
        info!("Menu item {} removed", menu_id);
        Ok(())
    }

    async fn patch_existing(&self, menu_id: &str, patch: MenuPatch) -> MenuResult<MenuItem> {
        if self.store.find_one(menu_id).await?.is_none() {
            return Err(MenuError::NotFound(menu_id.to_string()));
        }
        match self.store.upsert(menu_id, patch).await? {
            // Removed between the lookup and the write.
            UpsertOutcome::Created(_) => Err(MenuError::NotFound(menu_id.to_string())),
            outcome => Ok(outcome.into_item()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::model::{Category, Role};
    use crate::menu::query::MenuQueryService;
    use crate::menu::store::MemoryMenuStore;

    async fn seeded() -> (Arc<MemoryMenuStore>, MenuAdminService) {
        let store = Arc::new(MemoryMenuStore::new());
        let admin = MenuAdminService::new(store.clone());
        admin
            .upsert_definition(
                "team-roster",
                MenuPatch::definition("Team Roster", "/admin/team", Category::Administration, 85, Role::Admin),
            )
            .await
            .unwrap();
        (store, admin)
    }

    #[tokio::test]
    async fn disabling_hides_item_from_admin_menu() {
        let (store, admin) = seeded().await;
        let query = MenuQueryService::new(store);
        assert_eq!(query.visible_items(Role::Admin).await.unwrap().len(), 1);

        let item = admin.set_enabled("team-roster", false).await.unwrap();
        assert!(!item.is_enabled);
        assert!(query.visible_items(Role::Admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (_, admin) = seeded().await;
        assert!(matches!(admin.set_enabled("nope", true).await, Err(MenuError::NotFound(_))));
        assert!(matches!(admin.reorder("nope", 1).await, Err(MenuError::NotFound(_))));
        assert!(matches!(admin.remove("nope").await, Err(MenuError::NotFound(_))));
        assert!(matches!(admin.get("nope").await, Err(MenuError::NotFound(_))));
    }

    #[tokio::test]
    async fn set_enabled_does_not_create() {
        let (store, admin) = seeded().await;
        let _ = admin.set_enabled("ghost", false).await;
        assert!(store.find_one("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reorder_keeps_category_and_rejects_negative() {
        let (_, admin) = seeded().await;
        let item = admin.reorder("team-roster", 3).await.unwrap();
        assert_eq!(item.order, 3);
        assert_eq!(item.category, Category::Administration);

        assert!(matches!(admin.reorder("team-roster", -1).await, Err(MenuError::Validation(_))));
    }

    #[tokio::test]
    async fn upsert_definition_changes_role() {
        let (_, admin) = seeded().await;
        let patch = MenuPatch { required_role: Some(Role::DataSteward), ..Default::default() };
        let outcome = admin.upsert_definition("team-roster", patch).await.unwrap();
        assert!(matches!(outcome, UpsertOutcome::Updated(_)));
        assert_eq!(outcome.item().required_role, Role::DataSteward);
        assert_eq!(outcome.item().label, "Team Roster");
    }

    #[tokio::test]
    async fn create_rejects_existing_id() {
        let (_, admin) = seeded().await;
        let patch = MenuPatch::definition("Other", "/other", Category::Primary, 1, Role::User);
        assert!(matches!(admin.create("team-roster", patch).await, Err(MenuError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn remove_deletes_item() {
        let (store, admin) = seeded().await;
        admin.remove("team-roster").await.unwrap();
        assert!(store.find_one("team-roster").await.unwrap().is_none());
    }
}
