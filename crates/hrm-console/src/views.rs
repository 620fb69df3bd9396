//! Page view models, rendered as JSON.

use hrm_directory::DirectoryGroup;
use serde::Serialize;

/// A listing page: employees or groups.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub name: &'static str,
    /// Suffix of the `/add_{add_name}` page
    pub add_name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<TableRow>,
    /// Index of the header holding the delete link
    pub delete_column: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub id: String,
    /// Plain cells after the id
    pub cells: Vec<String>,
    /// Group names for an employee, member names for a group
    pub related: Vec<String>,
    pub delete_url: String,
}

/// An "add new" or login form.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub name: &'static str,
    pub fields: Vec<&'static str>,
    /// Indexes of fields rendered as password inputs
    pub password_fields: Vec<usize>,
    pub url: &'static str,
}

/// Group assignment page for one user.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipView {
    pub user_id: String,
    pub linked: Vec<DirectoryGroup>,
    pub unlinked: Vec<DirectoryGroup>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthView {
    pub status: &'static str,
    pub version: &'static str,
}
