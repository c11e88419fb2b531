use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::error;

use crate::database::manager::DatabaseHandle;
use crate::database::models::MenuItemRow;
use crate::menu::store::{resolve_upsert, MenuFilter, MenuStore, UpsertOutcome};
use crate::menu::{model, MenuError, MenuItem, MenuPatch, MenuResult};

const UNIQUE_VIOLATION: &str = "23505";

const SELECT_COLUMNS: &str = "SELECT menu_id, label, path, category, sort_order, required_role, \
     is_enabled, created_at, updated_at FROM menu_items";

// menu_id uses the C collation so ties sort the same way as in Rust.
const ORDER_BY: &str = "ORDER BY CASE category \
     WHEN 'primary' THEN 0 WHEN 'secondary' THEN 1 ELSE 2 END, \
     sort_order, menu_id COLLATE \"C\"";

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS menu_items (
        menu_id       TEXT PRIMARY KEY,
        label         TEXT NOT NULL CHECK (length(btrim(label)) > 0),
        path          TEXT NOT NULL CHECK (length(btrim(path)) > 0),
        category      TEXT NOT NULL DEFAULT 'primary'
                      CHECK (category IN ('primary', 'secondary', 'administration')),
        sort_order    INTEGER NOT NULL DEFAULT 0 CHECK (sort_order >= 0),
        required_role TEXT NOT NULL DEFAULT 'user'
                      CHECK (required_role IN ('user', 'data-steward', 'admin')),
        is_enabled    BOOLEAN NOT NULL DEFAULT TRUE,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS menu_items_category_order_idx ON menu_items (category, sort_order)";

/// PostgreSQL-backed registry. The primary key on `menu_id` is the
/// uniqueness index; every call is bounded by `query_timeout`.
pub struct PgMenuStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgMenuStore {
    pub fn new(handle: &DatabaseHandle, query_timeout: Duration) -> Self {
        Self {
            pool: handle.pool().clone(),
            query_timeout,
        }
    }

    /// Create the table and index if they do not exist yet.
    pub async fn ensure_schema(&self) -> MenuResult<()> {
        self.bounded(async {
            sqlx::query(CREATE_TABLE)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, ""))?;
            sqlx::query(CREATE_INDEX)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, ""))?;
            Ok::<_, MenuError>(())
        })
        .await
    }

    async fn bounded<T>(&self, op: impl Future<Output = MenuResult<T>>) -> MenuResult<T> {
        match tokio::time::timeout(self.query_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(MenuError::StoreUnavailable(format!(
                "menu store did not respond within {:?}",
                self.query_timeout
            ))),
        }
    }

    async fn insert_row<'e, E>(executor: E, item: &MenuItem) -> Result<(), sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO menu_items (menu_id, label, path, category, sort_order, required_role, \
             is_enabled, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&item.menu_id)
        .bind(&item.label)
        .bind(&item.path)
        .bind(item.category.as_str())
        .bind(item.order)
        .bind(item.required_role.as_str())
        .bind(item.is_enabled)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}

/// Connectivity failures become `StoreUnavailable`; unique violations become
/// `DuplicateKey`.
fn map_sqlx_error(err: sqlx::Error, menu_id: &str) -> MenuError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return MenuError::DuplicateKey(menu_id.to_string());
        }
    }

    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => MenuError::StoreUnavailable(err.to_string()),
        other => {
            error!("Menu store query failed: {}", other);
            MenuError::Internal(other.to_string())
        }
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn upsert(&self, menu_id: &str, fields: MenuPatch) -> MenuResult<UpsertOutcome> {
        self.bounded(async {
            let err = |e: sqlx::Error| map_sqlx_error(e, menu_id);
            let mut tx = self.pool.begin().await.map_err(err)?;

            // Row lock serializes concurrent writers on the same id.
            let existing: Option<MenuItemRow> =
                sqlx::query_as(&format!("{} WHERE menu_id = $1 FOR UPDATE", SELECT_COLUMNS))
                    .bind(menu_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(err)?;
            let existing = existing.map(MenuItem::try_from).transpose()?;

            let outcome = resolve_upsert(existing, menu_id, fields, Utc::now())?;
            match &outcome {
                UpsertOutcome::Created(item) => {
                    Self::insert_row(&mut *tx, item).await.map_err(err)?;
                }
                UpsertOutcome::Updated(item) => {
                    sqlx::query(
                        "UPDATE menu_items SET label = $2, path = $3, category = $4, sort_order = $5, \
                         required_role = $6, is_enabled = $7, updated_at = $8 WHERE menu_id = $1",
                    )
                    .bind(&item.menu_id)
                    .bind(&item.label)
                    .bind(&item.path)
                    .bind(item.category.as_str())
                    .bind(item.order)
                    .bind(item.required_role.as_str())
                    .bind(item.is_enabled)
                    .bind(item.updated_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(err)?;
                }
                UpsertOutcome::Unchanged(_) => {}
            }

            tx.commit().await.map_err(err)?;
            Ok::<_, MenuError>(outcome)
        })
        .await
    }

    async fn insert(&self, item: MenuItem) -> MenuResult<MenuItem> {
        model::validate(&item)?;
        self.bounded(async {
            Self::insert_row(&self.pool, &item)
                .await
                .map_err(|e| map_sqlx_error(e, &item.menu_id))?;
            Ok::<_, MenuError>(())
        })
        .await?;
        Ok(item)
    }

    async fn find_all(&self, filter: MenuFilter) -> MenuResult<Vec<MenuItem>> {
        self.bounded(async {
            let sql = format!(
                "{} WHERE ($1::boolean IS NULL OR is_enabled = $1) \
                 AND ($2::text IS NULL OR category = $2) {}",
                SELECT_COLUMNS, ORDER_BY
            );
            let rows: Vec<MenuItemRow> = sqlx::query_as(&sql)
                .bind(filter.is_enabled)
                .bind(filter.category.map(|c| c.as_str()))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, ""))?;

            rows.into_iter().map(MenuItem::try_from).collect()
        })
        .await
    }

    async fn find_one(&self, menu_id: &str) -> MenuResult<Option<MenuItem>> {
        self.bounded(async {
            let row: Option<MenuItemRow> = sqlx::query_as(&format!("{} WHERE menu_id = $1", SELECT_COLUMNS))
                .bind(menu_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, menu_id))?;

            row.map(MenuItem::try_from).transpose()
        })
        .await
    }

    async fn remove(&self, menu_id: &str) -> MenuResult<bool> {
        self.bounded(async {
            let result = sqlx::query("DELETE FROM menu_items WHERE menu_id = $1")
                .bind(menu_id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, menu_id))?;
            Ok::<_, MenuError>(result.rows_affected() > 0)
        })
        .await
    }

    async fn health_check(&self) -> MenuResult<()> {
        self.bounded(async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, ""))?;
            Ok::<_, MenuError>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_retryable() {
        assert!(map_sqlx_error(sqlx::Error::PoolTimedOut, "x").is_retryable());
        assert!(map_sqlx_error(sqlx::Error::PoolClosed, "x").is_retryable());
    }

    #[test]
    fn row_not_found_is_internal() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound, "x");
        assert!(matches!(err, MenuError::Internal(_)));
    }
}
