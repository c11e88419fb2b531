use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::defaults::DefaultItem;
use super::error::{MenuError, MenuResult, ValidationError};
use super::store::{MenuStore, UpsertOutcome};

/// Per-run summary for operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub created: usize,
    pub skipped: usize,
    pub patched: usize,
}

/// Bounded exponential backoff for startup seeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based). Doubles each time.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let delay = self.initial_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

/// Brings the registry to the default baseline without reverting admin edits.
///
/// Existing items are left alone unless their default entry is flagged
/// `force_update`.
pub struct Initializer {
    store: Arc<dyn MenuStore>,
    defaults: Vec<DefaultItem>,
}

impl Initializer {
    pub fn new(store: Arc<dyn MenuStore>, defaults: Vec<DefaultItem>) -> Self {
        Self { store, defaults }
    }

    /// Check the whole table without touching storage. Reports every invalid
    /// field of every entry, then duplicate ids.
    pub fn check_defaults(defaults: &[DefaultItem]) -> MenuResult<()> {
        let mut problems: Option<ValidationError> = None;
        for item in defaults {
            if let Err(err) = item.fields.clone().validate(&item.menu_id, true) {
                let err = err.scoped(&item.menu_id);
                match problems.as_mut() {
                    Some(all) => all.merge(err),
                    None => problems = Some(err),
                }
            }
        }
        if let Some(err) = problems {
            return Err(MenuError::Validation(err));
        }

        let mut seen = HashSet::new();
        for item in defaults {
            if !seen.insert(item.menu_id.as_str()) {
                return Err(MenuError::DuplicateDefinition(item.menu_id.clone()));
            }
        }
        Ok(())
    }

    pub async fn run(&self) -> MenuResult<InitReport> {
        Self::check_defaults(&self.defaults)?;

        let mut report = InitReport::default();
        for default in &self.defaults {
            let existing = self.store.find_one(&default.menu_id).await?;

            match existing {
                None => {
                    let item = default.fields.clone().into_item(&default.menu_id, chrono::Utc::now())?;
                    match self.store.insert(item).await {
                        Ok(_) => {
                            debug!("Created menu item {}", default.menu_id);
                            report.created += 1;
                        }
                        // Another initializer won the race; the item is present now.
                        Err(MenuError::DuplicateKey(_)) => {
                            debug!("Menu item {} appeared concurrently, skipping", default.menu_id);
                            report.skipped += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
                Some(_) if default.force_update => {
                    let outcome = self.store.upsert(&default.menu_id, default.fields.clone()).await?;
                    if let UpsertOutcome::Unchanged(_) = outcome {
                        report.skipped += 1;
                    } else {
                        info!("Force-updated menu item {}", default.menu_id);
                        report.patched += 1;
                    }
                }
                Some(_) => {
                    debug!("Menu item {} already present, leaving as is", default.menu_id);
                    report.skipped += 1;
                }
            }
        }

        info!(
            "Menu initialization complete: created {}, skipped {}, patched {}",
            report.created, report.skipped, report.patched
        );
        Ok(report)
    }

    /// Rerun the whole seeding pass while the store is unavailable. Every
    /// other error is returned on the first attempt.
    pub async fn run_with_retry(&self, policy: &RetryPolicy) -> MenuResult<InitReport> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.run().await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = policy.delay_for_attempt(attempt);
                    warn!(
                        "Menu initialization attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::defaults::default_menu;
    use crate::menu::model::{Category, MenuPatch, Role};
    use crate::menu::store::{MemoryMenuStore, MenuFilter};

    fn seed(store: &Arc<MemoryMenuStore>, defaults: Vec<DefaultItem>) -> Initializer {
        Initializer::new(store.clone(), defaults)
    }

    fn item(menu_id: &str, label: &str) -> DefaultItem {
        DefaultItem {
            menu_id: menu_id.to_string(),
            fields: MenuPatch::definition(label, &format!("/{}", menu_id), Category::Primary, 1, Role::User),
            force_update: false,
        }
    }

    #[tokio::test]
    async fn first_run_creates_everything() {
        let store = Arc::new(MemoryMenuStore::new());
        let report = seed(&store, default_menu()).run().await.unwrap();

        assert_eq!(report.created, default_menu().len());
        assert_eq!(report.skipped, 0);
        assert_eq!(store.find_all(MenuFilter::all()).await.unwrap().len(), default_menu().len());
    }

    #[tokio::test]
    async fn reruns_are_idempotent() {
        let store = Arc::new(MemoryMenuStore::new());
        let init = seed(&store, default_menu());

        init.run().await.unwrap();
        let after_first = store.find_all(MenuFilter::all()).await.unwrap();

        let second = init.run().await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, default_menu().len());
        assert_eq!(store.find_all(MenuFilter::all()).await.unwrap(), after_first);

        let writes = store.writes();
        init.run().await.unwrap();
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn rerun_keeps_admin_disable() {
        let store = Arc::new(MemoryMenuStore::new());
        let init = seed(&store, default_menu());
        init.run().await.unwrap();

        store.upsert("dashboard", MenuPatch::enabled(false)).await.unwrap();
        init.run().await.unwrap();

        let dashboard = store.find_one("dashboard").await.unwrap().unwrap();
        assert!(!dashboard.is_enabled);
    }

    #[tokio::test]
    async fn force_update_overwrites_stored_definition() {
        let store = Arc::new(MemoryMenuStore::new());
        seed(&store, vec![item("lineage", "Lineage")]).run().await.unwrap();
        store.upsert("lineage", MenuPatch::enabled(false)).await.unwrap();

        let mut fixed = item("lineage", "Data Lineage");
        fixed.force_update = true;
        let report = seed(&store, vec![fixed.clone()]).run().await.unwrap();
        assert_eq!(report.patched, 1);

        let stored = store.find_one("lineage").await.unwrap().unwrap();
        assert_eq!(stored.label, "Data Lineage");
        assert!(stored.is_enabled);

        let again = seed(&store, vec![fixed]).run().await.unwrap();
        assert_eq!(again, InitReport { created: 0, skipped: 1, patched: 0 });
    }

    #[tokio::test]
    async fn duplicate_defaults_fail_before_storage() {
        let store = Arc::new(MemoryMenuStore::new());
        let err = seed(&store, vec![item("kpis", "KPIs"), item("kpis", "KPIs again")])
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, MenuError::DuplicateDefinition(id) if id == "kpis"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn invalid_defaults_report_all_entries() {
        let store = Arc::new(MemoryMenuStore::new());
        let mut bad_label = item("kpis", "KPIs");
        bad_label.fields.label = Some(String::new());
        let mut bad_order = item("reports", "Reports");
        bad_order.fields.order = Some(-1);

        let err = seed(&store, vec![bad_label, bad_order]).run().await.unwrap_err();
        let MenuError::Validation(v) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = v.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["kpis.label", "reports.order"]);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_max_attempts() {
        let store = Arc::new(MemoryMenuStore::new());
        store.set_offline(true);
        let policy = RetryPolicy { max_attempts: 3, initial_delay_ms: 10, max_delay_ms: 100 };

        let err = seed(&store, default_menu()).run_with_retry(&policy).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_when_store_returns() {
        let store = Arc::new(MemoryMenuStore::new());
        store.set_offline(true);
        let policy = RetryPolicy { max_attempts: 5, initial_delay_ms: 50, max_delay_ms: 100 };

        let init = seed(&store, default_menu());
        let restore = {
            let store = store.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(60)).await;
                store.set_offline(false);
            })
        };

        let report = init.run_with_retry(&policy).await.unwrap();
        restore.await.unwrap();
        assert_eq!(report.created, default_menu().len());
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy { max_attempts: 10, initial_delay_ms: 100, max_delay_ms: 1000 };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(6), Duration::from_millis(1000));
    }
}
