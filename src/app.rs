use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

use crate::handlers::{elevated, protected, public};
use crate::menu::{MenuAdminService, MenuQueryService, MenuStore};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware};

/// Shared handler state. Services hold the same store handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MenuStore>,
    pub query: MenuQueryService,
    pub admin: MenuAdminService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn MenuStore>, jwt_secret: &str) -> Self {
        Self {
            query: MenuQueryService::new(store.clone()),
            admin: MenuAdminService::new(store.clone()),
            store,
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

/// Public → Protected (any valid token) → Elevated (admin token).
pub fn router(state: AppState) -> Router {
    let elevated = Router::new()
        .route(
            "/api/menu/items",
            get(elevated::list_items).post(elevated::create_item),
        )
        .route(
            "/api/menu/items/:menu_id",
            get(elevated::get_item)
                .put(elevated::put_item)
                .delete(elevated::delete_item),
        )
        .route("/api/menu/items/:menu_id/enabled", patch(elevated::set_enabled))
        .route("/api/menu/items/:menu_id/order", patch(elevated::set_order))
        .route_layer(middleware::from_fn(require_admin_middleware));

    let protected = Router::new()
        .route("/api/menu", get(protected::visible_menu))
        .merge(elevated)
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(protected)
        .with_state(state)
}
