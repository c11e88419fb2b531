use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::error::{MenuError, MenuResult};
use super::model::{Category, MenuItem, MenuPatch};

/// Optional restriction applied by [`MenuStore::find_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub is_enabled: Option<bool>,
    pub category: Option<Category>,
}

impl MenuFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn enabled() -> Self {
        Self { is_enabled: Some(true), ..Default::default() }
    }

    pub fn matches(&self, item: &MenuItem) -> bool {
        self.is_enabled.map_or(true, |e| item.is_enabled == e)
            && self.category.map_or(true, |c| item.category == c)
    }
}

/// What an upsert did to the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(MenuItem),
    Updated(MenuItem),
    Unchanged(MenuItem),
}

impl UpsertOutcome {
    pub fn item(&self) -> &MenuItem {
        match self {
            UpsertOutcome::Created(item) | UpsertOutcome::Updated(item) | UpsertOutcome::Unchanged(item) => item,
        }
    }

    pub fn into_item(self) -> MenuItem {
        match self {
            UpsertOutcome::Created(item) | UpsertOutcome::Updated(item) | UpsertOutcome::Unchanged(item) => item,
        }
    }

    pub fn wrote(&self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged(_))
    }
}

/// Keyed persistence for menu items with a uniqueness guarantee on `menu_id`.
///
/// `find_all` returns records ordered by `(category, order, menu_id)`.
/// Absence is reported as `Ok(None)` / `Ok(false)`, never as an error.
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn upsert(&self, menu_id: &str, fields: MenuPatch) -> MenuResult<UpsertOutcome>;

    /// Strict insert; fails with [`MenuError::DuplicateKey`] when the id exists.
    async fn insert(&self, item: MenuItem) -> MenuResult<MenuItem>;

    async fn find_all(&self, filter: MenuFilter) -> MenuResult<Vec<MenuItem>>;

    async fn find_one(&self, menu_id: &str) -> MenuResult<Option<MenuItem>>;

    /// Hard delete. Returns whether a record was removed.
    async fn remove(&self, menu_id: &str) -> MenuResult<bool>;

    async fn health_check(&self) -> MenuResult<()>;
}

/// Shared upsert decision used by every store implementation.
pub(crate) fn resolve_upsert(
    existing: Option<MenuItem>,
    menu_id: &str,
    fields: MenuPatch,
    now: DateTime<Utc>,
) -> MenuResult<UpsertOutcome> {
    match existing {
        None => Ok(UpsertOutcome::Created(fields.into_item(menu_id, now)?)),
        Some(mut item) => {
            let patch = fields.validate(menu_id, false)?;
            if item.apply(&patch, now) {
                Ok(UpsertOutcome::Updated(item))
            } else {
                Ok(UpsertOutcome::Unchanged(item))
            }
        }
    }
}

pub(crate) fn sort_items(items: &mut [MenuItem]) {
    items.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Process-local store. Backs the test suite and development runs without a
/// database. Counts writes so idempotent reruns can be observed.
#[derive(Debug, Default)]
pub struct MemoryMenuStore {
    items: RwLock<BTreeMap<String, MenuItem>>,
    writes: AtomicU64,
    offline: AtomicBool,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of inserts, updates and removals applied so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Simulate an outage: while offline every call fails with
    /// [`MenuError::StoreUnavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> MenuResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(MenuError::StoreUnavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn upsert(&self, menu_id: &str, fields: MenuPatch) -> MenuResult<UpsertOutcome> {
        self.ensure_online()?;
        let mut items = self.items.write().await;

        let outcome = resolve_upsert(items.get(menu_id).cloned(), menu_id, fields, Utc::now())?;
        if outcome.wrote() {
            items.insert(menu_id.to_string(), outcome.item().clone());
            self.record_write();
        }
        Ok(outcome)
    }

    async fn insert(&self, item: MenuItem) -> MenuResult<MenuItem> {
        self.ensure_online()?;
        super::model::validate(&item)?;
        let mut items = self.items.write().await;

        if items.contains_key(&item.menu_id) {
            return Err(MenuError::DuplicateKey(item.menu_id));
        }
        items.insert(item.menu_id.clone(), item.clone());
        self.record_write();
        Ok(item)
    }

    async fn find_all(&self, filter: MenuFilter) -> MenuResult<Vec<MenuItem>> {
        self.ensure_online()?;
        let items = self.items.read().await;

        let mut out: Vec<MenuItem> = items.values().filter(|i| filter.matches(i)).cloned().collect();
        sort_items(&mut out);
        Ok(out)
    }

    async fn find_one(&self, menu_id: &str) -> MenuResult<Option<MenuItem>> {
        self.ensure_online()?;
        Ok(self.items.read().await.get(menu_id).cloned())
    }

    async fn remove(&self, menu_id: &str) -> MenuResult<bool> {
        self.ensure_online()?;
        let removed = self.items.write().await.remove(menu_id).is_some();
        if removed {
            self.record_write();
        }
        Ok(removed)
    }

    async fn health_check(&self) -> MenuResult<()> {
        self.ensure_online()
    }
}
