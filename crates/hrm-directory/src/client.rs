//! Directory client seam.
//!
//! The console talks to the identity directory only through this trait, so
//! the remote API ([`crate::okta::OktaClient`]) and the in-memory directory
//! ([`crate::memory::InMemoryDirectory`]) are interchangeable.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{DirectoryGroup, DirectoryUser, GroupMember, NewGroup, NewUser};

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Provider identifier used in logs
    fn provider_type(&self) -> &'static str;

    async fn list_users(&self) -> Result<Vec<DirectoryUser>>;

    async fn list_groups(&self) -> Result<Vec<DirectoryGroup>>;

    async fn get_group(&self, group_id: &str) -> Result<DirectoryGroup>;

    /// Groups the user currently belongs to
    async fn groups_for_user(&self, user_id: &str) -> Result<Vec<DirectoryGroup>>;

    async fn group_members(&self, group_id: &str) -> Result<Vec<GroupMember>>;

    /// Create and activate a user, returning its id
    async fn create_user(&self, user: &NewUser) -> Result<String>;

    /// Create a group, returning its id
    async fn create_group(&self, group: &NewGroup) -> Result<String>;

    /// Add a user to a group. Adding an existing member succeeds.
    async fn add_member(&self, user_id: &str, group_id: &str) -> Result<()>;

    /// Remove a user from a group. Removing an absent member succeeds.
    async fn remove_member(&self, user_id: &str, group_id: &str) -> Result<()>;

    /// Deactivate, then delete, a user
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    async fn delete_group(&self, group_id: &str) -> Result<()>;

    async fn find_user_by_login(&self, login: &str) -> Result<Option<DirectoryUser>>;

    /// Check primary credentials. Any failure to reach the directory is
    /// reported as `false`.
    async fn authenticate(&self, username: &str, password: &str) -> bool;

    /// All groups the user is *not* a member of, in directory order.
    async fn unrelated_groups(&self, user_id: &str) -> Result<Vec<DirectoryGroup>> {
        let all_groups = self.list_groups().await?;
        let member_of: HashSet<String> = self
            .groups_for_user(user_id)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();

        Ok(all_groups
            .into_iter()
            .filter(|g| !member_of.contains(&g.id))
            .collect())
    }
}
