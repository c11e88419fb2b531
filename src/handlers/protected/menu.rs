use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::menu::MenuSection;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/menu - Navigation sections visible to the caller's role
pub async fn visible_menu(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<MenuSection>> {
    let sections = state.query.visible_items(user.role).await?;
    tracing::debug!(
        "Served {} menu sections to '{}' ({})",
        sections.len(),
        user.subject,
        user.role
    );
    Ok(ApiResponse::success(sections))
}
