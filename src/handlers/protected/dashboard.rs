use axum::extract::State;
use serde::Serialize;

use crate::auth::Identity;
use crate::editor::Workspace;
use crate::middleware::{ApiResponse, ApiResult, CurrentIdentity};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: Identity,
    #[serde(flatten)]
    pub workspace: Workspace,
}

async fn view(state: &AppState, user: Identity) -> DashboardView {
    let workspace = state
        .workspaces
        .snapshot(user.session_id)
        .await
        .unwrap_or_default();
    DashboardView { user, workspace }
}

/// GET /dashboard - The session's workspace, loading it on first visit
pub async fn get(
    State(state): State<AppState>,
    CurrentIdentity(user): CurrentIdentity,
) -> ApiResult<DashboardView> {
    state.workspaces.ensure_loaded(&user, &state.store).await;
    Ok(ApiResponse::success(view(&state, user).await))
}

/// POST /dashboard/reload - Refetch every collection
pub async fn reload(
    State(state): State<AppState>,
    CurrentIdentity(user): CurrentIdentity,
) -> ApiResult<DashboardView> {
    state.workspaces.reload(&user, &state.store).await;
    Ok(ApiResponse::success(view(&state, user).await))
}
