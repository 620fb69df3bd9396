//! Okta Management API Client
//!
//! Implements [`DirectoryClient`] against the Okta REST API:
//! - `SSWS` token authentication on every management call
//! - Per-request timeout
//! - Idempotent membership writes (PUT to add, DELETE tolerating 404 to remove)
//! - Primary authentication through `/api/v1/authn`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::client::DirectoryClient;
use crate::error::{DirectoryError, Result};
use crate::model::{
    AuthnRequest, CreateGroupBody, CreateUserBody, CreatedResource, DirectoryGroup, DirectoryUser,
    GroupMember, GroupResource, NewGroup, NewUser, UserResource,
};

/// Connection settings for [`OktaClient`]
#[derive(Debug, Clone)]
pub struct OktaConfig {
    /// Tenant base URL, e.g. `https://example.okta.com`
    pub domain: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl OktaConfig {
    pub fn new(domain: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OktaClient {
    http: reqwest::Client,
    base_url: String,
    authorization: String,
}

impl OktaClient {
    pub fn new(config: OktaConfig) -> Result<Self> {
        if config.domain.is_empty() || config.api_token.is_empty() {
            return Err(DirectoryError::configuration(
                "Okta domain and API token must both be set",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        info!(domain = %config.domain, timeout_secs = config.timeout.as_secs(), "OktaClient initialized");

        Ok(Self {
            http,
            base_url: config.domain.trim_end_matches('/').to_string(),
            authorization: format!("SSWS {}", config.api_token),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(header::AUTHORIZATION, &self.authorization)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        let response = ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| DirectoryError::decode(format!("GET {}: {}", path, e)))
    }

    async fn post_for_id<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        let response = ensure_success(response).await?;
        let created: CreatedResource = response
            .json()
            .await
            .map_err(|e| DirectoryError::decode(format!("POST {}: {}", path, e)))?;
        Ok(created.id)
    }

    async fn delete(&self, path: &str) -> Result<StatusCode> {
        let response = self.request(Method::DELETE, path).send().await?;
        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(status);
        }
        Err(status_error(response).await)
    }
}

/// Turn a 404 from the directory into [`DirectoryError::NotFound`].
fn missing<'a>(
    entity_type: &'static str,
    id: &'a str,
) -> impl FnOnce(DirectoryError) -> DirectoryError + 'a {
    move |e| match e.http_status() {
        Some(404) => DirectoryError::not_found(entity_type, id),
        _ => e,
    }
}

/// Quote a value for an Okta `search` expression.
fn search_literal(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn seg(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

async fn status_error(response: Response) -> DirectoryError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    DirectoryError::status(status, body)
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

#[async_trait]
impl DirectoryClient for OktaClient {
    fn provider_type(&self) -> &'static str {
        "okta"
    }

    async fn list_users(&self) -> Result<Vec<DirectoryUser>> {
        let users: Vec<UserResource> = self.get_json("/api/v1/users").await?;
        debug!(count = users.len(), "Listed directory users");
        Ok(users.into_iter().map(DirectoryUser::from).collect())
    }

    async fn list_groups(&self) -> Result<Vec<DirectoryGroup>> {
        let groups: Vec<GroupResource> = self.get_json("/api/v1/groups").await?;
        debug!(count = groups.len(), "Listed directory groups");
        Ok(groups.into_iter().map(DirectoryGroup::from).collect())
    }

    async fn get_group(&self, group_id: &str) -> Result<DirectoryGroup> {
        let group: GroupResource = self
            .get_json(&format!("/api/v1/groups/{}", seg(group_id)))
            .await
            .map_err(missing("Group", group_id))?;
        Ok(group.into())
    }

    async fn groups_for_user(&self, user_id: &str) -> Result<Vec<DirectoryGroup>> {
        let groups: Vec<GroupResource> = self
            .get_json(&format!("/api/v1/users/{}/groups", seg(user_id)))
            .await
            .map_err(missing("User", user_id))?;
        Ok(groups.into_iter().map(DirectoryGroup::from).collect())
    }

    async fn group_members(&self, group_id: &str) -> Result<Vec<GroupMember>> {
        let members: Vec<UserResource> = self
            .get_json(&format!("/api/v1/groups/{}/users", seg(group_id)))
            .await
            .map_err(missing("Group", group_id))?;
        Ok(members.into_iter().map(GroupMember::from).collect())
    }

    async fn create_user(&self, user: &NewUser) -> Result<String> {
        let id = self
            .post_for_id("/api/v1/users?activate=true", &CreateUserBody::from(user))
            .await?;
        info!(user_id = %id, login = %user.email, "Directory user created");
        Ok(id)
    }

    async fn create_group(&self, group: &NewGroup) -> Result<String> {
        let id = self
            .post_for_id("/api/v1/groups", &CreateGroupBody::from(group))
            .await?;
        info!(group_id = %id, name = %group.name, "Directory group created");
        Ok(id)
    }

    async fn add_member(&self, user_id: &str, group_id: &str) -> Result<()> {
        let path = format!("/api/v1/groups/{}/users/{}", seg(group_id), seg(user_id));
        let response = self.request(Method::PUT, &path).send().await?;
        ensure_success(response).await?;
        debug!(user_id = %user_id, group_id = %group_id, "Added group member");
        Ok(())
    }

    async fn remove_member(&self, user_id: &str, group_id: &str) -> Result<()> {
        let path = format!("/api/v1/groups/{}/users/{}", seg(group_id), seg(user_id));
        match self.delete(&path).await {
            Ok(_) => {
                debug!(user_id = %user_id, group_id = %group_id, "Removed group member");
                Ok(())
            }
            Err(e) if e.http_status() == Some(404) => {
                debug!(user_id = %user_id, group_id = %group_id, "Membership already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let deactivate = format!("/api/v1/users/{}/lifecycle/deactivate", seg(user_id));
        let response = self.request(Method::POST, &deactivate).send().await?;
        ensure_success(response)
            .await
            .map_err(missing("User", user_id))?;

        self.delete(&format!("/api/v1/users/{}", seg(user_id)))
            .await
            .map_err(missing("User", user_id))?;
        info!(user_id = %user_id, "Directory user deleted");
        Ok(())
    }

    async fn delete_group(&self, group_id: &str) -> Result<()> {
        self.delete(&format!("/api/v1/groups/{}", seg(group_id)))
            .await
            .map_err(missing("Group", group_id))?;
        info!(group_id = %group_id, "Directory group deleted");
        Ok(())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<DirectoryUser>> {
        let search = format!("profile.login eq {}", search_literal(login));
        let response = self
            .request(Method::GET, "/api/v1/users")
            .query(&[("search", search.as_str())])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let users: Vec<UserResource> = response
            .json()
            .await
            .map_err(|e| DirectoryError::decode(format!("user search: {}", e)))?;
        Ok(users.into_iter().next().map(DirectoryUser::from))
    }

    async fn authenticate(&self, username: &str, password: &str) -> bool {
        let result = self
            .http
            .post(self.url("/api/v1/authn"))
            .header(header::ACCEPT, "application/json")
            .json(&AuthnRequest { username, password })
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                debug!(status = %response.status(), "Primary authentication rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "Primary authentication request failed");
                false
            }
        }
    }
}
