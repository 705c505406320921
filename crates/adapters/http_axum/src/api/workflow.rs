//! JSON handler for the workflow actions.
//!
//! `POST /api/workflow/{action}` with a `{"ids": [...]}` body, where
//! `action` is one of `review`, `ready`, `without`, `warranty`, `delivered`
//! or `draft`. The response lists the services that changed.

use axum::Json;
use axum::extract::{Path, State};

use techserv_domain::service::{Service, ServiceState};

use crate::api::Selection;
use crate::context::Ctx;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Reset to review, for members of the draft group.
pub const DRAFT_ACTION: &str = "draft";

/// `POST /api/workflow/{action}`
pub async fn apply<B: Backend>(
    State(state): State<AppState<B>>,
    ctx: Ctx,
    Path(action): Path<String>,
    Json(selection): Json<Selection>,
) -> Result<Json<Vec<Service>>, ApiError> {
    if action == DRAFT_ACTION {
        let ctx = ctx.require_user()?;
        let reset = state.workflow.draft(&ctx, &selection.ids).await?;
        return Ok(Json(reset));
    }

    let target = action
        .parse::<ServiceState>()
        .ok()
        .filter(|target| ServiceState::ACTIONS.contains(target))
        .ok_or_else(|| ApiError::unknown_action(&action))?;
    let changed = state
        .workflow
        .transition(&ctx.0, target, &selection.ids)
        .await?;
    Ok(Json(changed))
}
