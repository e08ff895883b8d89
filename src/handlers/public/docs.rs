use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::content::{ContentSnapshot, DocsView, SectionPage};
use crate::database::models::{CodeExample, Section};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DocsQuery {
    /// Case-insensitive substring filter; blank means no filter
    pub q: Option<String>,
}

/// GET / - All four docs tabs, optionally filtered
pub async fn get(State(state): State<AppState>, Query(query): Query<DocsQuery>) -> ApiResult<DocsView> {
    let snapshot = ContentSnapshot::load(&state.store).await;
    Ok(ApiResponse::success(DocsView::build(&snapshot, query.q.as_deref())))
}

/// GET /sections/:slug - One section with its code examples
pub async fn section_get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<SectionPage> {
    let section = state
        .repo::<Section>()
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Section '{}' not found", slug)))?;
    let examples = state.repo::<CodeExample>().list().await?;

    Ok(ApiResponse::success(SectionPage::new(section, &examples)))
}
