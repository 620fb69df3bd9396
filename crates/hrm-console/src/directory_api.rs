//! Employee and group pages
//!
//! Listing, creating and deleting directory users and groups.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Redirect},
};
use axum_extra::extract::Form;
use tracing::info;

use crate::error::Result;
use crate::forms::{
    EntityKind, NewEmployeeForm, NewGroupForm, EMPLOYEE_FIELDS, EMPLOYEE_PASSWORD_FIELDS,
    GROUP_FIELDS,
};
use crate::middleware::{ConsoleState, SessionUser};
use crate::views::{FormView, TableRow, TableView};

pub async fn index(_user: SessionUser) -> Redirect {
    Redirect::to("/employees")
}

/// Employee table with each user's group names.
pub async fn list_employees(
    _user: SessionUser,
    State(state): State<ConsoleState>,
) -> Result<Json<TableView>> {
    let users = state.directory.list_users().await?;

    let mut rows = Vec::with_capacity(users.len());
    for user in users {
        let mut groups: Vec<String> = state
            .directory
            .groups_for_user(&user.id)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();
        if groups.is_empty() {
            groups.push("No Groups".to_string());
        }

        rows.push(TableRow {
            delete_url: format!("/delete/employee/{}", user.id),
            cells: vec![user.display_name, user.title, user.login],
            related: groups,
            id: user.id,
        });
    }

    Ok(Json(TableView {
        name: "Employee",
        add_name: "employee",
        headers: vec!["ID", "Name", "Department", "E-mail", "Groups", "Delete"],
        rows,
        delete_column: 5,
    }))
}

/// Group table with each group's member names.
pub async fn list_groups(
    _user: SessionUser,
    State(state): State<ConsoleState>,
) -> Result<Json<TableView>> {
    let groups = state.directory.list_groups().await?;

    let mut rows = Vec::with_capacity(groups.len());
    for group in groups {
        let mut members: Vec<String> = state
            .directory
            .group_members(&group.id)
            .await?
            .into_iter()
            .map(|m| m.display_name)
            .collect();
        if members.is_empty() {
            members.push("No Members".to_string());
        }

        rows.push(TableRow {
            delete_url: format!("/delete/group/{}", group.id),
            cells: vec![group.name],
            related: members,
            id: group.id,
        });
    }

    Ok(Json(TableView {
        name: "Group",
        add_name: "group",
        headers: vec!["ID", "Name", "Members", "Delete"],
        rows,
        delete_column: 3,
    }))
}

pub async fn add_employee_form(_user: SessionUser) -> Json<FormView> {
    Json(FormView {
        name: "Employee",
        fields: EMPLOYEE_FIELDS.to_vec(),
        password_fields: EMPLOYEE_PASSWORD_FIELDS.to_vec(),
        url: "employee",
    })
}

pub async fn add_group_form(_user: SessionUser) -> Json<FormView> {
    Json(FormView {
        name: "Group",
        fields: GROUP_FIELDS.to_vec(),
        password_fields: Vec::new(),
        url: "group",
    })
}

/// Create an employee or group from the submitted form.
pub async fn add_entity(
    user: SessionUser,
    State(state): State<ConsoleState>,
    Path(kind): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    match kind.parse::<EntityKind>()? {
        EntityKind::Employee => {
            let new_user = NewEmployeeForm::from_fields(&fields).validate()?;
            let id = state.directory.create_user(&new_user).await?;
            info!(by = %user.username(), user_id = %id, login = %new_user.email, "Employee added");
        }
        EntityKind::Group => {
            let new_group = NewGroupForm::from_fields(&fields).validate()?;
            let id = state.directory.create_group(&new_group).await?;
            info!(by = %user.username(), group_id = %id, name = %new_group.name, "Group added");
        }
    }

    Ok(Redirect::to("/"))
}

pub async fn delete_entity(
    user: SessionUser,
    State(state): State<ConsoleState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let kind = kind.parse::<EntityKind>()?;
    match kind {
        EntityKind::Employee => state.directory.delete_user(&id).await?,
        EntityKind::Group => state.directory.delete_group(&id).await?,
    }

    info!(by = %user.username(), kind = kind.as_str(), id = %id, "Entry deleted");
    Ok(Redirect::to("/"))
}
