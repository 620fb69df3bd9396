//! Typed console form input.
//!
//! Form field names are the labels shown on the pages.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use hrm_directory::{NewGroup, NewUser};
use serde::Deserialize;

use crate::error::{ConsoleError, Result};

pub const EMPLOYEE_FIELDS: [&str; 5] = [
    "First Name",
    "Last Name",
    "E-mail",
    "Password",
    "Repeat Password",
];
pub const EMPLOYEE_PASSWORD_FIELDS: [usize; 2] = [3, 4];

pub const GROUP_FIELDS: [&str; 1] = ["Group Name"];

pub const LOGIN_FIELDS: [&str; 2] = ["Username", "Password"];
pub const LOGIN_PASSWORD_FIELDS: [usize; 1] = [1];

/// Entity named in a console path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Employee,
    Group,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::Group => "group",
        }
    }
}

impl FromStr for EntityKind {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "employee" => Ok(EntityKind::Employee),
            "group" => Ok(EntityKind::Group),
            _ => Err(ConsoleError::InvalidKind),
        }
    }
}

fn field(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Submitted "add employee" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub repeat_password: String,
}

impl NewEmployeeForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        // Passwords are taken verbatim
        Self {
            first_name: field(fields, EMPLOYEE_FIELDS[0]),
            last_name: field(fields, EMPLOYEE_FIELDS[1]),
            email: field(fields, EMPLOYEE_FIELDS[2]),
            password: fields.get(EMPLOYEE_FIELDS[3]).cloned().unwrap_or_default(),
            repeat_password: fields.get(EMPLOYEE_FIELDS[4]).cloned().unwrap_or_default(),
        }
    }

    pub fn validate(self) -> Result<NewUser> {
        let required = [
            (EMPLOYEE_FIELDS[0], &self.first_name),
            (EMPLOYEE_FIELDS[1], &self.last_name),
            (EMPLOYEE_FIELDS[2], &self.email),
            (EMPLOYEE_FIELDS[3], &self.password),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(ConsoleError::validation(format!("{} is required", name)));
        }
        if !self.email.contains('@') {
            return Err(ConsoleError::validation("E-mail must contain '@'"));
        }
        if self.password != self.repeat_password {
            return Err(ConsoleError::validation("Passwords do not match"));
        }

        Ok(NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
        })
    }
}

/// Submitted "add group" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroupForm {
    pub name: String,
}

impl NewGroupForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            name: field(fields, GROUP_FIELDS[0]),
        }
    }

    pub fn validate(self) -> Result<NewGroup> {
        if self.name.is_empty() {
            return Err(ConsoleError::validation("Group Name is required"));
        }
        Ok(NewGroup { name: self.name })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "Username", default)]
    pub username: String,
    #[serde(rename = "Password", default)]
    pub password: String,
}

/// Checked group ids for a user; repeated `group_ids` fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipForm {
    #[serde(default)]
    pub group_ids: Vec<String>,
}

impl MembershipForm {
    pub fn desired(&self) -> HashSet<String> {
        self.group_ids
            .iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect()
    }
}
