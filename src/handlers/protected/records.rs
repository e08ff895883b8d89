// handlers/protected/records.rs - Create, update and delete for editable kinds
//
// Mounted once per kind, e.g. `post(records::create::<Pattern>)`. Every
// write goes through the session workspace so the dashboard copy and its
// notices stay in step with the store.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::editor::WorkspaceSlot;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentIdentity};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
    pub deleted: bool,
}

fn missing<T: WorkspaceSlot>(id: Uuid) -> ApiError {
    ApiError::not_found(format!("{} {} not found", T::LABEL, id))
}

/// POST /dashboard/{kind} - New record from the kind's template; any
/// supplied fields replace the template's, except `order`
pub async fn create<T: WorkspaceSlot>(
    State(state): State<AppState>,
    CurrentIdentity(user): CurrentIdentity,
    Json(fields): Json<T::Patch>,
) -> ApiResult<T> {
    let created = state
        .workspaces
        .create::<T>(&user, &state.store, fields)
        .await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /dashboard/{kind}/:id - Partial update
pub async fn update<T: WorkspaceSlot>(
    State(state): State<AppState>,
    CurrentIdentity(user): CurrentIdentity,
    Path(id): Path<Uuid>,
    Json(patch): Json<T::Patch>,
) -> ApiResult<T> {
    let updated = state
        .workspaces
        .update::<T>(user.session_id, &state.store, id, patch)
        .await?
        .ok_or_else(|| missing::<T>(id))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /dashboard/{kind}/:id
pub async fn delete<T: WorkspaceSlot>(
    State(state): State<AppState>,
    CurrentIdentity(user): CurrentIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    let deleted = state
        .workspaces
        .delete::<T>(user.session_id, &state.store, id)
        .await?;
    if !deleted {
        return Err(missing::<T>(id));
    }
    Ok(ApiResponse::success(Deleted { id, deleted }))
}
