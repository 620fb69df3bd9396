//! Group assignment for a single employee.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Redirect},
};
use axum_extra::extract::Form;
use hrm_directory::reconcile;
use tracing::{info, warn};

use crate::error::{ConsoleError, Result};
use crate::forms::{EntityKind, MembershipForm};
use crate::middleware::{ConsoleState, SessionUser};
use crate::views::MembershipView;

/// Linked and unlinked groups for a user. Only `group` is a valid kind.
pub async fn membership_page(
    _user: SessionUser,
    State(state): State<ConsoleState>,
    Path((kind, user_id)): Path<(String, String)>,
) -> Result<Json<MembershipView>> {
    let kind = kind.parse::<EntityKind>()?;
    if kind != EntityKind::Group {
        return Err(ConsoleError::InvalidKind);
    }

    let unlinked = state.directory.unrelated_groups(&user_id).await?;
    let linked = state.directory.groups_for_user(&user_id).await?;

    Ok(Json(MembershipView {
        url: format!("/update_user/{}/", kind.as_str()),
        user_id,
        linked,
        unlinked,
    }))
}

/// Reconcile the user's memberships with the checked groups.
pub async fn update_memberships(
    user: SessionUser,
    State(state): State<ConsoleState>,
    Path(user_id): Path<String>,
    Form(form): Form<MembershipForm>,
) -> Result<impl IntoResponse> {
    let desired = form.desired();
    let report = reconcile(state.directory.as_ref(), &user_id, &desired).await?;

    if report.is_complete() {
        info!(
            by = %user.username(),
            user_id = %user_id,
            added = report.added.len(),
            removed = report.removed.len(),
            "Memberships updated"
        );
    } else {
        warn!(
            by = %user.username(),
            user_id = %user_id,
            failed = report.failed.len(),
            "Memberships partially updated"
        );
    }

    Ok(Redirect::to("/"))
}
