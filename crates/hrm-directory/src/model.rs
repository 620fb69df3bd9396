//! Directory domain types and their wire representation.

use serde::{Deserialize, Serialize};

/// A user as shown in the console's employee table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub display_name: String,
    /// Department / job title
    pub title: String,
    pub login: String,
}

/// A group as shown in the console's group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryGroup {
    pub id: String,
    pub name: String,
}

/// A member row of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: String,
    pub display_name: String,
    pub login: String,
}

/// Input for creating a user. The login is the e-mail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Wire types (Okta management API)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl UserProfile {
    /// `displayName`, else "first last" (blank parts kept as empty strings).
    pub fn resolved_display_name(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or(""),
                self.last_name.as_deref().unwrap_or("")
            ),
        }
    }

    /// `login`, else `email`, else empty.
    pub fn resolved_login(&self) -> String {
        self.login
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("")
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResource {
    pub id: String,
    #[serde(default)]
    pub profile: UserProfile,
}

impl From<UserResource> for DirectoryUser {
    fn from(u: UserResource) -> Self {
        let title = u
            .profile
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "No Title".to_string());
        Self {
            display_name: u.profile.resolved_display_name(),
            login: u.profile.resolved_login(),
            title,
            id: u.id,
        }
    }
}

impl From<UserResource> for GroupMember {
    fn from(u: UserResource) -> Self {
        Self {
            display_name: u.profile.resolved_display_name(),
            login: u.profile.resolved_login(),
            id: u.id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupResource {
    pub id: String,
    #[serde(default)]
    pub profile: GroupProfile,
}

impl From<GroupResource> for DirectoryGroup {
    fn from(g: GroupResource) -> Self {
        Self {
            id: g.id,
            name: g.profile.name.unwrap_or_default(),
        }
    }
}

/// Body of `POST /api/v1/users`
#[derive(Debug, Serialize)]
pub struct CreateUserBody {
    pub profile: UserProfile,
    pub credentials: Credentials,
}

#[derive(Debug, Serialize)]
pub struct Credentials {
    pub password: PasswordValue,
}

#[derive(Debug, Serialize)]
pub struct PasswordValue {
    pub value: String,
}

impl From<&NewUser> for CreateUserBody {
    fn from(user: &NewUser) -> Self {
        Self {
            profile: UserProfile {
                first_name: Some(user.first_name.clone()),
                last_name: Some(user.last_name.clone()),
                email: Some(user.email.clone()),
                login: Some(user.email.clone()),
                display_name: Some(user.display_name()),
                title: None,
            },
            credentials: Credentials {
                password: PasswordValue { value: user.password.clone() },
            },
        }
    }
}

/// Body of `POST /api/v1/groups`
#[derive(Debug, Serialize)]
pub struct CreateGroupBody {
    pub profile: GroupProfile,
}

impl From<&NewGroup> for CreateGroupBody {
    fn from(group: &NewGroup) -> Self {
        Self {
            profile: GroupProfile {
                name: Some(group.name.clone()),
                description: Some(group.name.clone()),
            },
        }
    }
}

/// Minimal response carrying the id of a created resource.
#[derive(Debug, Deserialize)]
pub struct CreatedResource {
    pub id: String,
}

/// Body of `POST /api/v1/authn`
#[derive(Debug, Serialize)]
pub struct AuthnRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}
